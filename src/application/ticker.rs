//! Ticker callback registry and dispatch.
//!
//! Raw events flow from a [`TickerFeed`] through a bounded channel into a
//! single dispatcher task:
//!
//! ```text
//! TickerFeed ──pump task──▶ mpsc (bounded) ──dispatch task──▶ TickerHub ──▶ callbacks
//!                                             │
//!                                             └─ translate (catalog lookup)
//! ```
//!
//! Callbacks run on the dispatch task. One failing or panicking callback is
//! logged and does not stop delivery to the others.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::{CallbackId, OrderSide, Product, TickerMessage};
use crate::error::{Error, Result};
use crate::port::{ProductCatalog, RawTicker, TickerFeed};

/// User callback: receives the exchange name and the translated message.
pub type TickerCallback =
    Arc<dyn Fn(&str, &TickerMessage) -> anyhow::Result<()> + Send + Sync>;

struct Subscription {
    id: CallbackId,
    pattern: Option<Product>,
    callback: TickerCallback,
}

impl Subscription {
    fn wants(&self, product: &Product) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) if pattern.is_empty() => true,
            Some(pattern) => pattern.partial_match(product),
        }
    }
}

#[derive(Default)]
struct Subscriptions {
    next_seq: u64,
    by_seq: BTreeMap<u64, Arc<Subscription>>,
    seq_of: HashMap<CallbackId, u64>,
}

/// Outcome of one [`TickerHub::dispatch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Callbacks that returned `Ok`.
    pub delivered: usize,
    /// Callbacks that returned an error or panicked.
    pub failed: usize,
}

/// Registered ticker callbacks for one exchange, in registration order.
pub struct TickerHub {
    exchange_name: &'static str,
    subscriptions: RwLock<Subscriptions>,
}

impl TickerHub {
    pub fn new(exchange_name: &'static str) -> Self {
        Self {
            exchange_name,
            subscriptions: RwLock::new(Subscriptions::default()),
        }
    }

    #[must_use]
    pub fn exchange_name(&self) -> &'static str {
        self.exchange_name
    }

    /// Register a callback. `None` or an empty pattern matches every product.
    pub fn add(&self, callback: TickerCallback, pattern: Option<Product>) -> CallbackId {
        let id = CallbackId::new();
        let mut subs = self.subscriptions.write();
        let seq = subs.next_seq;
        subs.next_seq += 1;
        subs.by_seq.insert(
            seq,
            Arc::new(Subscription {
                id,
                pattern,
                callback,
            }),
        );
        subs.seq_of.insert(id, seq);
        debug!(callback_id = %id, "Ticker callback registered");
        id
    }

    /// Remove a callback. Returns `false` if the id is not registered.
    pub fn remove(&self, id: CallbackId) -> bool {
        let mut subs = self.subscriptions.write();
        match subs.seq_of.remove(&id) {
            Some(seq) => {
                subs.by_seq.remove(&seq);
                debug!(callback_id = %id, "Ticker callback removed");
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut subs = self.subscriptions.write();
        subs.by_seq.clear();
        subs.seq_of.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.read().by_seq.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every matching callback in registration order.
    ///
    /// The callback list is snapshotted first, so callbacks may register or
    /// remove callbacks without deadlocking.
    pub fn dispatch(&self, message: &TickerMessage) -> DispatchReport {
        let snapshot: Vec<Arc<Subscription>> =
            self.subscriptions.read().by_seq.values().cloned().collect();

        let mut report = DispatchReport::default();
        for sub in snapshot.iter().filter(|s| s.wants(&message.product)) {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                (sub.callback)(self.exchange_name, message)
            }));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(callback_id = %sub.id, error = %e, "Ticker callback failed");
                }
                Err(_) => {
                    report.failed += 1;
                    warn!(callback_id = %sub.id, "Ticker callback panicked");
                }
            }
        }
        report
    }
}

/// Build a [`TickerMessage`] from a raw feed event.
///
/// The product is resolved through `catalog`, which may trigger one lookup.
pub async fn translate(raw: RawTicker, catalog: &dyn ProductCatalog) -> Result<TickerMessage> {
    let time = DateTime::parse_from_rfc3339(&raw.time)
        .map_err(|e| Error::Decode {
            what: "ticker time",
            reason: format!("{}: {e}", raw.time),
        })?
        .with_timezone(&Utc);
    let order_side = OrderSide::from_str(&raw.side)?;
    let product = catalog.get_product(&raw.product_id).await?;

    Ok(TickerMessage {
        product,
        time,
        order_side,
        last_size: raw.last_size,
        price: raw.price,
        best_bid: raw.best_bid,
        best_ask: raw.best_ask,
    })
}

/// Handle to the pump and dispatch tasks. Dropping it stops both.
pub struct TickerDispatcher {
    pump: JoinHandle<()>,
    dispatch: JoinHandle<()>,
}

impl TickerDispatcher {
    /// Start delivering events from an already subscribed `feed`.
    pub fn spawn<F>(
        mut feed: F,
        catalog: Arc<dyn ProductCatalog>,
        hub: Arc<TickerHub>,
        capacity: usize,
    ) -> Self
    where
        F: TickerFeed + 'static,
    {
        let (event_tx, mut event_rx) = mpsc::channel::<RawTicker>(capacity.max(1));
        let exchange = feed.exchange_name();

        let pump = tokio::spawn(async move {
            while let Some(raw) = feed.next_ticker().await {
                trace!(exchange, product_id = %raw.product_id, "Ticker received");
                if event_tx.send(raw).await.is_err() {
                    debug!(exchange, "Dispatch channel closed, stopping pump");
                    return;
                }
            }
            info!(exchange, "Ticker feed ended");
        });

        let dispatch = tokio::spawn(async move {
            while let Some(raw) = event_rx.recv().await {
                let product_id = raw.product_id.clone();
                match translate(raw, catalog.as_ref()).await {
                    Ok(message) => {
                        let report = hub.dispatch(&message);
                        trace!(
                            exchange,
                            product_id = %product_id,
                            delivered = report.delivered,
                            failed = report.failed,
                            "Ticker dispatched"
                        );
                    }
                    Err(e) => {
                        warn!(exchange, product_id = %product_id, error = %e, "Dropping ticker");
                    }
                }
            }
            debug!(exchange, "Ticker dispatch finished");
        });

        Self { pump, dispatch }
    }

    /// Stop both tasks. Events still queued are discarded.
    pub fn shutdown(&self) {
        self.pump.abort();
        self.dispatch.abort();
    }

    /// Wait until the feed has ended and every queued event is dispatched.
    pub async fn finished(&mut self) {
        let _ = (&mut self.pump).await;
        let _ = (&mut self.dispatch).await;
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pump.is_finished() && self.dispatch.is_finished()
    }
}

impl Drop for TickerDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::application::CachedCatalog;
    use crate::testkit::catalog::StubFetcher;
    use crate::testkit::domain::raw_ticker;
    use crate::testkit::feed::channel_feed;

    type Seen = Arc<Mutex<Vec<String>>>;

    fn recorder(tag: &'static str, seen: &Seen) -> TickerCallback {
        let seen = Arc::clone(seen);
        Arc::new(move |_exchange, message| {
            seen.lock().push(format!(
                "{tag}:{}",
                message.product.product_id.as_ref().map_or("", |id| id.as_str())
            ));
            Ok(())
        })
    }

    async fn message(product_id: &str) -> TickerMessage {
        let catalog = CachedCatalog::new(StubFetcher::sample());
        translate(raw_ticker(product_id, "buy", dec!(10)), &catalog)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn pattern_filters_delivery() {
        let hub = TickerHub::new("test");
        let seen = Seen::default();
        hub.add(recorder("btc", &seen), Some(Product::with_base("BTC")));
        hub.add(recorder("all", &seen), None);

        hub.dispatch(&message("BTC-USD").await);
        hub.dispatch(&message("ETH-USD").await);

        assert_eq!(*seen.lock(), ["btc:BTC-USD", "all:BTC-USD", "all:ETH-USD"]);
    }

    #[tokio::test]
    async fn empty_pattern_matches_everything() {
        let hub = TickerHub::new("test");
        let seen = Seen::default();
        hub.add(recorder("empty", &seen), Some(Product::default()));

        let report = hub.dispatch(&message("ETH-BTC").await);
        assert_eq!(report.delivered, 1);
    }

    #[tokio::test]
    async fn failures_are_isolated() {
        let hub = TickerHub::new("test");
        let seen = Seen::default();
        hub.add(Arc::new(|_, _| anyhow::bail!("boom")), None);
        hub.add(Arc::new(|_, _| panic!("callback panic")), None);
        hub.add(recorder("after", &seen), None);

        let report = hub.dispatch(&message("BTC-USD").await);

        assert_eq!(
            report,
            DispatchReport {
                delivered: 1,
                failed: 2
            }
        );
        assert_eq!(*seen.lock(), ["after:BTC-USD"]);
    }

    #[tokio::test]
    async fn callbacks_receive_exchange_name() {
        let hub = TickerHub::new("Coinbase");
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        hub.add(
            Arc::new(move |exchange, _| {
                sink.lock().push(exchange.to_string());
                Ok(())
            }),
            None,
        );

        hub.dispatch(&message("BTC-USD").await);
        assert_eq!(*names.lock(), ["Coinbase"]);
    }

    #[test]
    fn remove_and_clear() {
        let hub = TickerHub::new("test");
        let seen = Seen::default();
        let first = hub.add(recorder("a", &seen), None);
        hub.add(recorder("b", &seen), None);

        assert!(hub.remove(first));
        assert!(!hub.remove(first));
        assert_eq!(hub.len(), 1);

        hub.clear();
        assert!(hub.is_empty());
    }

    #[tokio::test]
    async fn translate_resolves_product_and_parses_fields() {
        let catalog = CachedCatalog::new(StubFetcher::sample());
        let msg = translate(raw_ticker("ETH-BTC", "sell", dec!(0.05)), &catalog)
            .await
            .unwrap();

        assert_eq!(msg.product, Product::resolved("ETH-BTC", "ETH", "BTC"));
        assert_eq!(msg.order_side, OrderSide::Sell);
        assert_eq!(msg.time.timestamp_subsec_micros(), 123_456);
        assert_eq!(msg.price, dec!(0.05));
    }

    #[tokio::test]
    async fn translate_rejects_bad_time() {
        let catalog = CachedCatalog::new(StubFetcher::sample());
        let mut raw = raw_ticker("BTC-USD", "buy", dec!(1));
        raw.time = "yesterday".into();

        let err = translate(raw, &catalog).await.unwrap_err();
        assert!(matches!(err, Error::Decode { what: "ticker time", .. }));
    }

    #[tokio::test]
    async fn dispatcher_delivers_in_order_and_skips_bad_events() {
        let catalog: Arc<dyn ProductCatalog> = Arc::new(CachedCatalog::new(StubFetcher::sample()));
        let hub = Arc::new(TickerHub::new("test"));
        let seen = Seen::default();
        hub.add(recorder("all", &seen), None);

        let (feed, handle) = channel_feed(16);
        let mut dispatcher = TickerDispatcher::spawn(feed, catalog, Arc::clone(&hub), 4);

        handle.send(raw_ticker("BTC-USD", "buy", dec!(1))).await;
        handle.send(raw_ticker("DOGE-XYZ", "buy", dec!(1))).await;
        handle.send(raw_ticker("ETH-USD", "sell", dec!(2))).await;
        handle.close().await;
        dispatcher.finished().await;

        assert_eq!(*seen.lock(), ["all:BTC-USD", "all:ETH-USD"]);
        assert!(dispatcher.is_finished());
    }
}
