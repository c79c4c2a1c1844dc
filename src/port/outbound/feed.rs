//! Streaming ticker port.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::ProductId;
use crate::error::Result;

/// A ticker event as delivered by an exchange feed, before translation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTicker {
    pub product_id: ProductId,
    /// ISO-8601 / RFC 3339 timestamp.
    pub time: String,
    /// `buy` or `sell`.
    pub side: String,
    pub last_size: Decimal,
    pub price: Decimal,
    pub best_bid: Decimal,
    pub best_ask: Decimal,
}

/// Real-time ticker feed from an exchange.
///
/// Implementations handle the connection and the exchange's message format.
#[async_trait]
pub trait TickerFeed: Send {
    /// Open the connection. Returns once it is ready for subscriptions.
    async fn connect(&mut self) -> Result<()>;

    /// Subscribe to the ticker channel for these products.
    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()>;

    /// Receive the next ticker event.
    ///
    /// Returns `None` when the feed is closed.
    async fn next_ticker(&mut self) -> Option<RawTicker>;

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}

#[async_trait]
impl TickerFeed for Box<dyn TickerFeed> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        (**self).subscribe(product_ids).await
    }

    async fn next_ticker(&mut self) -> Option<RawTicker> {
        (**self).next_ticker().await
    }

    fn exchange_name(&self) -> &'static str {
        (**self).exchange_name()
    }
}
