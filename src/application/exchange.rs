//! Exchange facades.
//!
//! [`Exchange`] composes a product catalog, an order-book registry and a
//! ticker hub. [`AuthenticatedExchange`] adds account and order capabilities
//! on top of an [`Exchange`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use super::registry::OrderBookRegistry;
use super::ticker::{TickerCallback, TickerDispatcher, TickerHub};
use crate::domain::{
    Account, AccountId, CallbackId, MarketAmount, OrderId, OrderReport, OrderSide, Product,
    ProductId,
};
use crate::error::{LookupError, Result, UsageError};
use crate::port::{
    AccountCapability, OrderBookFactory, ProductCatalog, ProductOrderBook, TickerFeed,
    TradingCapability,
};

/// Periodic order-book refresh task. Dropping it stops the task.
struct BookRefresher(JoinHandle<()>);

impl BookRefresher {
    fn spawn(exchange: &'static str, factory: Arc<dyn OrderBookFactory>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately and the books are fresh.
            interval.tick().await;
            loop {
                interval.tick().await;
                match factory.refresh_order_books().await {
                    Ok(refreshed) => trace!(exchange, refreshed, "Order books refreshed"),
                    Err(e) => warn!(exchange, error = %e, "Order book refresh failed"),
                }
            }
        });
        Self(handle)
    }
}

impl Drop for BookRefresher {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Unauthenticated access to one exchange.
pub struct Exchange {
    name: &'static str,
    catalog: Arc<dyn ProductCatalog>,
    registry: OrderBookRegistry,
    hub: Arc<TickerHub>,
    dispatcher: Mutex<Option<TickerDispatcher>>,
    refresher: Mutex<Option<BookRefresher>>,
}

impl Exchange {
    /// An exchange with an empty registry.
    pub fn new(
        name: &'static str,
        catalog: Arc<dyn ProductCatalog>,
        factory: Arc<dyn OrderBookFactory>,
    ) -> Self {
        Self {
            name,
            catalog,
            registry: OrderBookRegistry::new(factory),
            hub: Arc::new(TickerHub::new(name)),
            dispatcher: Mutex::new(None),
            refresher: Mutex::new(None),
        }
    }

    /// Build an exchange and register books for `product_ids`.
    pub async fn with_products(
        name: &'static str,
        catalog: Arc<dyn ProductCatalog>,
        factory: Arc<dyn OrderBookFactory>,
        product_ids: &[ProductId],
    ) -> Result<Self> {
        let exchange = Self::new(name, catalog, factory);
        exchange.registry.initialize(product_ids).await?;
        Ok(exchange)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn ProductCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn registry(&self) -> &OrderBookRegistry {
        &self.registry
    }

    // --- products ---

    pub fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId {
        self.catalog.make_product_id(base_currency, quote_currency)
    }

    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product> {
        self.catalog.get_product(product_id).await
    }

    pub async fn get_all_products(&self) -> Result<Vec<Product>> {
        self.catalog.get_all_products().await
    }

    pub fn clear_product_cache(&self) {
        self.catalog.clear_cache();
    }

    pub async fn get_base_currency(&self, product_id: &ProductId) -> Result<String> {
        self.catalog.get_base_currency(product_id).await
    }

    pub async fn get_quote_currency(&self, product_id: &ProductId) -> Result<String> {
        self.catalog.get_quote_currency(product_id).await
    }

    // --- order books ---

    pub async fn add_order_book(&self, product_id: &ProductId) -> Result<Arc<ProductOrderBook>> {
        self.registry.add_order_book(product_id).await
    }

    pub async fn add_order_books(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Arc<ProductOrderBook>>> {
        self.registry.add_order_books(product_ids).await
    }

    pub fn get_order_book(&self, product_id: &ProductId) -> Result<Arc<ProductOrderBook>> {
        self.registry.get_order_book(product_id)
    }

    /// Look a book up by its currency pair instead of its id.
    pub fn get_order_book_by_currencies(
        &self,
        base_currency: &str,
        quote_currency: &str,
    ) -> Result<Arc<ProductOrderBook>> {
        self.registry
            .get_order_book(&self.make_product_id(base_currency, quote_currency))
    }

    pub fn get_order_books_by_base_currency(&self, currency: &str) -> Vec<Arc<ProductOrderBook>> {
        self.registry.get_order_books_by_base_currency(currency)
    }

    pub fn get_order_books_by_quote_currency(&self, currency: &str) -> Vec<Arc<ProductOrderBook>> {
        self.registry.get_order_books_by_quote_currency(currency)
    }

    pub fn get_tracked_products(&self) -> BTreeSet<ProductId> {
        self.registry.get_tracked_products()
    }

    /// Refresh every tracked book once. Returns how many were refreshed.
    pub async fn refresh_order_books(&self) -> Result<usize> {
        self.registry.refresh().await
    }

    /// Refresh every tracked book each `period` until [`shutdown`](Self::shutdown).
    ///
    /// Failed rounds are logged and retried on the next tick. A running
    /// refresh task is replaced. Must be called within a Tokio runtime.
    pub fn start_book_refresh(&self, period: Duration) {
        let period = period.max(Duration::from_millis(1));
        let refresher =
            BookRefresher::spawn(self.name, Arc::clone(self.registry.factory()), period);
        if self.refresher.lock().replace(refresher).is_some() {
            debug!(exchange = self.name, "Replaced book refresh task");
        }
        info!(
            exchange = self.name,
            period_ms = period.as_millis() as u64,
            "Book refresh started"
        );
    }

    #[must_use]
    pub fn is_refreshing_books(&self) -> bool {
        self.refresher
            .lock()
            .as_ref()
            .is_some_and(|r| !r.0.is_finished())
    }

    // --- tickers ---

    /// Register a ticker callback. An absent or empty pattern matches all
    /// products; otherwise the product must partially match it.
    pub fn add_ticker_callback(
        &self,
        callback: TickerCallback,
        pattern: Option<Product>,
    ) -> CallbackId {
        self.hub.add(callback, pattern)
    }

    pub fn remove_ticker_callback(&self, id: CallbackId) -> bool {
        self.hub.remove(id)
    }

    pub fn remove_all_ticker_callbacks(&self) {
        self.hub.clear();
    }

    pub fn ticker_callback_count(&self) -> usize {
        self.hub.len()
    }

    /// Start dispatching events from an already subscribed feed.
    ///
    /// A previously attached feed is stopped.
    pub fn attach_ticker_feed<F>(&self, feed: F, capacity: usize)
    where
        F: TickerFeed + 'static,
    {
        let dispatcher = TickerDispatcher::spawn(
            feed,
            Arc::clone(&self.catalog),
            Arc::clone(&self.hub),
            capacity,
        );
        if self.dispatcher.lock().replace(dispatcher).is_some() {
            debug!(exchange = self.name, "Replaced ticker feed");
        }
    }

    #[must_use]
    pub fn has_ticker_feed(&self) -> bool {
        self.dispatcher
            .lock()
            .as_ref()
            .is_some_and(|d| !d.is_finished())
    }

    /// Stop ticker dispatch and book refresh. Registered callbacks stay
    /// registered.
    pub fn shutdown(&self) {
        if let Some(dispatcher) = self.dispatcher.lock().take() {
            dispatcher.shutdown();
            info!(exchange = self.name, "Ticker dispatch stopped");
        }
        if self.refresher.lock().take().is_some() {
            info!(exchange = self.name, "Book refresh stopped");
        }
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("name", &self.name)
            .field("tracked", &self.registry.len())
            .field("ticker_callbacks", &self.hub.len())
            .finish_non_exhaustive()
    }
}

/// An [`Exchange`] with account and order capabilities.
pub struct AuthenticatedExchange {
    exchange: Exchange,
    accounts: Arc<dyn AccountCapability>,
    trading: Arc<dyn TradingCapability>,
    /// currency -> account id, rebuilt by `refresh_accounts`.
    directory: RwLock<HashMap<String, AccountId>>,
}

impl AuthenticatedExchange {
    /// Wrap `exchange` and populate the account directory once.
    pub async fn new(
        exchange: Exchange,
        accounts: Arc<dyn AccountCapability>,
        trading: Arc<dyn TradingCapability>,
    ) -> Result<Self> {
        let this = Self {
            exchange,
            accounts,
            trading,
            directory: RwLock::new(HashMap::new()),
        };
        this.refresh_accounts().await?;
        Ok(this)
    }

    #[must_use]
    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Rebuild the currency directory from a full account listing.
    ///
    /// Returns the number of accounts seen.
    pub async fn refresh_accounts(&self) -> Result<usize> {
        let accounts = self.accounts.list_accounts().await?;
        let directory: HashMap<_, _> = accounts
            .iter()
            .map(|a| (a.currency.clone(), a.account_id.clone()))
            .collect();
        info!(
            exchange = self.exchange.name,
            accounts = accounts.len(),
            "Account directory refreshed"
        );
        *self.directory.write() = directory;
        Ok(accounts.len())
    }

    pub async fn get_all_accounts(&self) -> Result<Vec<Account>> {
        self.accounts.list_accounts().await
    }

    /// One account, selected by exactly one of `currency` or `account_id`.
    ///
    /// Currency lookups use the directory as of the last refresh.
    pub async fn get_account(
        &self,
        currency: Option<&str>,
        account_id: Option<&AccountId>,
    ) -> Result<Account> {
        let account_id = match (currency, account_id) {
            (Some(_), Some(_)) => return Err(UsageError::ConflictingAccountSelectors.into()),
            (None, None) => return Err(UsageError::MissingAccountSelector.into()),
            (None, Some(id)) => id.clone(),
            (Some(currency), None) => self
                .directory
                .read()
                .get(currency)
                .cloned()
                .ok_or_else(|| LookupError::UnknownCurrency {
                    currency: currency.to_string(),
                })?,
        };
        self.accounts.account(&account_id).await
    }

    pub async fn cancel_order(
        &self,
        order_id: &OrderId,
        product_id: Option<&ProductId>,
    ) -> Result<OrderId> {
        let cancelled = self.trading.cancel_order(order_id, product_id).await?;
        info!(exchange = self.exchange.name, order_id = %cancelled, "Order cancelled");
        Ok(cancelled)
    }

    pub async fn limit_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        price: Decimal,
        size: Decimal,
    ) -> Result<OrderReport> {
        let report = self
            .trading
            .limit_order(product_id, side, price, size)
            .await?;
        info!(
            exchange = self.exchange.name,
            order_id = %report.order_id,
            product_id = %product_id,
            side = %side,
            price = %price,
            size = %size,
            "Limit order placed"
        );
        Ok(report)
    }

    pub async fn market_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        amount: MarketAmount,
    ) -> Result<OrderReport> {
        let report = self.trading.market_order(product_id, side, amount).await?;
        info!(
            exchange = self.exchange.name,
            order_id = %report.order_id,
            product_id = %product_id,
            side = %side,
            "Market order placed"
        );
        Ok(report)
    }
}

impl fmt::Debug for AuthenticatedExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedExchange")
            .field("exchange", &self.exchange)
            .field("accounts", &self.directory.read().len())
            .finish_non_exhaustive()
    }
}
