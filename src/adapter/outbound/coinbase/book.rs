//! Coinbase order books kept as level-2 REST snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::client::CoinbaseClient;
use crate::domain::{ProductId, SharedBook};
use crate::error::{Error, LookupError, Result};
use crate::port::{LiveOrderBook, OrderBookFactory, OrderBookSource, ProductCatalog, ProductOrderBook};

/// Owns one [`SharedBook`] per tracked Coinbase product.
///
/// Books change only when refreshed through [`OrderBookSource::refresh`];
/// views handed out earlier observe every refresh.
pub struct CoinbaseBookSource {
    client: Arc<CoinbaseClient>,
    books: RwLock<HashMap<ProductId, Arc<SharedBook>>>,
}

impl CoinbaseBookSource {
    pub fn new(client: Arc<CoinbaseClient>) -> Self {
        Self {
            client,
            books: RwLock::new(HashMap::new()),
        }
    }

    fn book_for(&self, product_id: &ProductId) -> Arc<SharedBook> {
        Arc::clone(
            self.books
                .write()
                .entry(product_id.clone())
                .or_insert_with(|| Arc::new(SharedBook::new())),
        )
    }

    /// Replace one tracked book with a fresh snapshot.
    pub async fn refresh_product(&self, product_id: &ProductId) -> Result<()> {
        let book = self
            .books
            .read()
            .get(product_id)
            .cloned()
            .ok_or_else(|| LookupError::UnknownOrderBook {
                product_id: product_id.to_string(),
            })?;
        let snapshot = self.client.get_product_book(product_id).await?;
        let (bids, asks) = snapshot.into_levels();
        book.replace(bids, asks);
        debug!(product_id = %product_id, depth = ?book.depth(), "Order book refreshed");
        Ok(())
    }
}

#[async_trait]
impl OrderBookSource for CoinbaseBookSource {
    async fn track(&self, product_ids: &[ProductId]) -> Result<()> {
        let snapshots = try_join_all(
            product_ids
                .iter()
                .map(|id| self.client.get_product_book(id)),
        )
        .await?;

        for (product_id, snapshot) in product_ids.iter().zip(snapshots) {
            let (bids, asks) = snapshot.into_levels();
            self.book_for(product_id).replace(bids, asks);
        }
        info!(count = product_ids.len(), "Tracking Coinbase order books");
        Ok(())
    }

    fn order_book(&self, product_id: &ProductId) -> Option<Arc<dyn LiveOrderBook>> {
        self.books
            .read()
            .get(product_id)
            .map(|book| Arc::clone(book) as Arc<dyn LiveOrderBook>)
    }

    /// Re-fetch every tracked book in parallel.
    async fn refresh(&self) -> Result<usize> {
        let ids: Vec<ProductId> = self.books.read().keys().cloned().collect();
        try_join_all(ids.iter().map(|id| self.refresh_product(id))).await?;
        Ok(ids.len())
    }
}

/// Builds Coinbase views, tracking each batch with a single request round.
pub struct CoinbaseBookFactory {
    catalog: Arc<dyn ProductCatalog>,
    source: Arc<CoinbaseBookSource>,
}

impl CoinbaseBookFactory {
    pub fn new(catalog: Arc<dyn ProductCatalog>, source: Arc<CoinbaseBookSource>) -> Self {
        Self { catalog, source }
    }
}

#[async_trait]
impl OrderBookFactory for CoinbaseBookFactory {
    async fn make_order_book(&self, product_id: &ProductId) -> Result<ProductOrderBook> {
        self.make_order_books(std::slice::from_ref(product_id))
            .await?
            .pop()
            .ok_or(Error::FactoryMismatch {
                requested: 1,
                built: 0,
            })
    }

    async fn make_order_books(&self, product_ids: &[ProductId]) -> Result<Vec<ProductOrderBook>> {
        let mut currencies = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            currencies.push((
                self.catalog.get_base_currency(product_id).await?,
                self.catalog.get_quote_currency(product_id).await?,
            ));
        }

        self.source.track(product_ids).await?;

        product_ids
            .iter()
            .zip(currencies)
            .map(|(product_id, (base_currency, quote_currency))| {
                let book = self.source.order_book(product_id).ok_or_else(|| {
                    LookupError::UnknownOrderBook {
                        product_id: product_id.to_string(),
                    }
                })?;
                Ok(ProductOrderBook::new(
                    product_id.clone(),
                    base_currency,
                    quote_currency,
                    book,
                ))
            })
            .collect()
    }

    async fn refresh_order_books(&self) -> Result<usize> {
        self.source.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CachedCatalog;
    use crate::domain::Product;
    use crate::testkit::catalog::StubFetcher;

    #[tokio::test]
    async fn unresolved_products_get_no_view() {
        let catalog: Arc<dyn ProductCatalog> = Arc::new(CachedCatalog::new(StubFetcher::new(
            vec![Product::with_id("HALF-USD")],
        )));
        let client = Arc::new(CoinbaseClient::new("http://127.0.0.1:9"));
        let source = Arc::new(CoinbaseBookSource::new(client));
        let factory = CoinbaseBookFactory::new(catalog, Arc::clone(&source));

        let id = ProductId::from("HALF-USD");
        let err = factory.make_order_books(&[id.clone()]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Lookup(LookupError::UnresolvedProduct {
                field: "base currency",
                ..
            })
        ));
        assert!(source.order_book(&id).is_none());
    }
}
