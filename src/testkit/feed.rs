//! Channel-backed [`TickerFeed`] with external control.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::domain::ProductId;
use crate::error::Result;
use crate::port::{RawTicker, TickerFeed};

/// A feed controlled through a [`ChannelFeedHandle`]. No network I/O.
pub struct ChannelFeed {
    event_rx: mpsc::Receiver<Option<RawTicker>>,
    connect_count: Arc<AtomicU32>,
    subscribed: Arc<Mutex<Vec<ProductId>>>,
}

/// Control handle for a [`ChannelFeed`].
#[derive(Clone)]
pub struct ChannelFeedHandle {
    event_tx: mpsc::Sender<Option<RawTicker>>,
    connect_count: Arc<AtomicU32>,
    subscribed: Arc<Mutex<Vec<ProductId>>>,
}

impl ChannelFeedHandle {
    /// Deliver a raw ticker to the feed.
    pub async fn send(&self, ticker: RawTicker) {
        let _ = self.event_tx.send(Some(ticker)).await;
    }

    /// Signal end-of-feed (`next_ticker` returns `None`).
    pub async fn close(&self) {
        let _ = self.event_tx.send(None).await;
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Every product subscribed so far.
    pub fn subscribed(&self) -> Vec<ProductId> {
        self.subscribed.lock().clone()
    }
}

/// Create a [`ChannelFeed`] and its control handle.
pub fn channel_feed(buffer: usize) -> (ChannelFeed, ChannelFeedHandle) {
    let (tx, rx) = mpsc::channel(buffer);
    let connect_count = Arc::new(AtomicU32::new(0));
    let subscribed = Arc::new(Mutex::new(Vec::new()));
    (
        ChannelFeed {
            event_rx: rx,
            connect_count: Arc::clone(&connect_count),
            subscribed: Arc::clone(&subscribed),
        },
        ChannelFeedHandle {
            event_tx: tx,
            connect_count,
            subscribed,
        },
    )
}

#[async_trait]
impl TickerFeed for ChannelFeed {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        self.subscribed.lock().extend_from_slice(product_ids);
        Ok(())
    }

    async fn next_ticker(&mut self) -> Option<RawTicker> {
        self.event_rx.recv().await.flatten()
    }

    fn exchange_name(&self) -> &'static str {
        "channel"
    }
}
