//! Assembly of Coinbase exchange facades.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::book::{CoinbaseBookFactory, CoinbaseBookSource};
use super::client::CoinbaseClient;
use super::settings::CoinbaseConfig;
use super::stream::CoinbaseTickerStream;
use super::trading::{CoinbaseAuthClient, CoinbaseTrading};
use crate::application::{AuthenticatedExchange, CachedCatalog, Exchange};
use crate::domain::ProductId;
use crate::error::{with_timeout, Result};
use crate::port::{ProductCatalog, TickerFeed};

pub const EXCHANGE_NAME: &str = "Coinbase";

/// Build an unauthenticated Coinbase exchange tracking `product_ids`.
///
/// Tracked books are re-fetched every `book_refresh_ms` until shutdown. With
/// `ticker_capacity` set and at least one product, the ticker feed is
/// connected, subscribed to `product_ids` and attached with a dispatch
/// channel of that capacity. Every network step is bounded by the configured
/// timeouts.
pub async fn connect(
    config: &CoinbaseConfig,
    product_ids: &[ProductId],
    ticker_capacity: Option<usize>,
) -> Result<Exchange> {
    let client = Arc::new(CoinbaseClient::from_config(config));
    let catalog: Arc<dyn ProductCatalog> = Arc::new(CachedCatalog::new(Arc::clone(&client)));
    let source = Arc::new(CoinbaseBookSource::new(client));
    let factory = Arc::new(CoinbaseBookFactory::new(Arc::clone(&catalog), source));

    // Products resolve one request at a time; snapshots then go in parallel.
    let budget_ms = config
        .request_timeout_ms
        .saturating_mul(product_ids.len() as u64 + 1);
    let exchange = with_timeout(
        "initial order book fetch",
        budget_ms,
        Exchange::with_products(EXCHANGE_NAME, catalog, factory, product_ids),
    )
    .await?;
    if config.book_refresh_ms > 0 {
        exchange.start_book_refresh(Duration::from_millis(config.book_refresh_ms));
    }

    if let Some(capacity) = ticker_capacity.filter(|_| !product_ids.is_empty()) {
        let mut stream = CoinbaseTickerStream::new(config.ws_url.clone());
        with_timeout("feed connection", config.connect_timeout_ms, stream.connect()).await?;
        with_timeout(
            "ticker subscription",
            config.request_timeout_ms,
            stream.subscribe(product_ids),
        )
        .await?;
        exchange.attach_ticker_feed(stream, capacity);
    }

    info!(
        exchange = EXCHANGE_NAME,
        products = product_ids.len(),
        ticker = exchange.has_ticker_feed(),
        "Exchange ready"
    );
    Ok(exchange)
}

/// Build an authenticated Coinbase exchange over an external signed client.
///
/// The account directory is populated once, within the request timeout.
pub async fn connect_authenticated(
    config: &CoinbaseConfig,
    product_ids: &[ProductId],
    ticker_capacity: Option<usize>,
    client: Arc<dyn CoinbaseAuthClient>,
) -> Result<AuthenticatedExchange> {
    let exchange = connect(config, product_ids, ticker_capacity).await?;
    let trading = Arc::new(CoinbaseTrading::new(client, Arc::clone(exchange.catalog())));
    with_timeout(
        "account listing",
        config.request_timeout_ms,
        AuthenticatedExchange::new(exchange, trading.clone(), trading),
    )
    .await
}
