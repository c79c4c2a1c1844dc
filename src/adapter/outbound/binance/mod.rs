//! Binance spot integration: products and depth snapshots only.

pub mod book;
pub mod client;
pub mod dto;
pub mod settings;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use book::{BinanceBookFactory, BinanceBookSource};
pub use client::BinanceClient;
pub use settings::BinanceConfig;

use crate::application::{CachedCatalog, Exchange};
use crate::domain::ProductId;
use crate::error::{with_timeout, Result};
use crate::port::ProductCatalog;

pub const EXCHANGE_NAME: &str = "Binance";

/// Build an unauthenticated Binance exchange tracking `product_ids`.
///
/// Depth snapshots are re-fetched every `book_refresh_ms` until shutdown.
/// Binance has no ticker feed here; callbacks can be registered but never
/// fire.
pub async fn connect(config: &BinanceConfig, product_ids: &[ProductId]) -> Result<Exchange> {
    let client = Arc::new(BinanceClient::from_config(config));
    let catalog: Arc<dyn ProductCatalog> = Arc::new(CachedCatalog::new(Arc::clone(&client)));
    let source = Arc::new(BinanceBookSource::new(client));
    let factory = Arc::new(BinanceBookFactory::new(Arc::clone(&catalog), source));

    // One request per symbol, so the bound scales with the batch.
    let budget_ms = config
        .request_timeout_ms
        .saturating_mul(product_ids.len().max(1) as u64 * 2);
    let exchange = with_timeout(
        "initial order book fetch",
        budget_ms,
        Exchange::with_products(EXCHANGE_NAME, catalog, factory, product_ids),
    )
    .await?;
    if config.book_refresh_ms > 0 {
        exchange.start_book_refresh(Duration::from_millis(config.book_refresh_ms));
    }

    info!(exchange = EXCHANGE_NAME, products = product_ids.len(), "Exchange ready");
    Ok(exchange)
}
