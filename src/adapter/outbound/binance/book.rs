//! Binance order books kept as REST depth snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::client::BinanceClient;
use crate::domain::{ProductId, SharedBook};
use crate::error::{LookupError, Result};
use crate::port::{LiveOrderBook, OrderBookFactory, OrderBookSource, ProductCatalog, ProductOrderBook};

pub struct BinanceBookSource {
    client: Arc<BinanceClient>,
    books: RwLock<HashMap<ProductId, Arc<SharedBook>>>,
}

impl BinanceBookSource {
    pub fn new(client: Arc<BinanceClient>) -> Self {
        Self {
            client,
            books: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a fresh depth snapshot for one tracked symbol.
    pub async fn refresh_symbol(&self, product_id: &ProductId) -> Result<()> {
        let book = self
            .books
            .read()
            .get(product_id)
            .cloned()
            .ok_or_else(|| LookupError::UnknownOrderBook {
                product_id: product_id.to_string(),
            })?;
        let (bids, asks) = self.client.get_depth(product_id).await?.into_levels();
        book.replace(bids, asks);
        Ok(())
    }
}

#[async_trait]
impl OrderBookSource for BinanceBookSource {
    /// Binance has no batch depth endpoint; symbols are fetched in turn.
    async fn track(&self, product_ids: &[ProductId]) -> Result<()> {
        for product_id in product_ids {
            let (bids, asks) = self.client.get_depth(product_id).await?.into_levels();
            let book = Arc::clone(
                self.books
                    .write()
                    .entry(product_id.clone())
                    .or_insert_with(|| Arc::new(SharedBook::new())),
            );
            book.replace(bids, asks);
            debug!(product_id = %product_id, depth = ?book.depth(), "Tracking Binance order book");
        }
        Ok(())
    }

    fn order_book(&self, product_id: &ProductId) -> Option<Arc<dyn LiveOrderBook>> {
        self.books
            .read()
            .get(product_id)
            .map(|book| Arc::clone(book) as Arc<dyn LiveOrderBook>)
    }

    /// Symbols are re-fetched in turn, like `track`.
    async fn refresh(&self) -> Result<usize> {
        let ids: Vec<ProductId> = self.books.read().keys().cloned().collect();
        for product_id in &ids {
            self.refresh_symbol(product_id).await?;
        }
        Ok(ids.len())
    }
}

/// Single-product factory; batches use the trait's per-product default.
pub struct BinanceBookFactory {
    catalog: Arc<dyn ProductCatalog>,
    source: Arc<BinanceBookSource>,
}

impl BinanceBookFactory {
    pub fn new(catalog: Arc<dyn ProductCatalog>, source: Arc<BinanceBookSource>) -> Self {
        Self { catalog, source }
    }
}

#[async_trait]
impl OrderBookFactory for BinanceBookFactory {
    async fn make_order_book(&self, product_id: &ProductId) -> Result<ProductOrderBook> {
        let base_currency = self.catalog.get_base_currency(product_id).await?;
        let quote_currency = self.catalog.get_quote_currency(product_id).await?;
        self.source.track(std::slice::from_ref(product_id)).await?;
        let book = self
            .source
            .order_book(product_id)
            .ok_or_else(|| LookupError::UnknownOrderBook {
                product_id: product_id.to_string(),
            })?;
        Ok(ProductOrderBook::new(
            product_id.clone(),
            base_currency,
            quote_currency,
            book,
        ))
    }

    async fn refresh_order_books(&self) -> Result<usize> {
        self.source.refresh().await
    }
}
