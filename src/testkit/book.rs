//! In-memory order-book source and factory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::domain::{ask_ladder, bid_ladder};
use crate::domain::{ProductId, SharedBook};
use crate::error::{LookupError, Result};
use crate::port::{LiveOrderBook, OrderBookFactory, OrderBookSource, ProductCatalog, ProductOrderBook};

/// An [`OrderBookSource`] backed by [`SharedBook`]s.
///
/// Tracking a product seeds it with five bid levels from 100 down and five
/// ask levels from 101 up. Each refresh moves both ladders up by one. Every
/// `track` call is recorded.
#[derive(Default)]
pub struct StubBookSource {
    books: RwLock<HashMap<ProductId, Arc<SharedBook>>>,
    track_calls: Mutex<Vec<Vec<ProductId>>>,
    refreshes: AtomicU32,
}

impl StubBookSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The batches passed to `track`, in call order.
    pub fn track_calls(&self) -> Vec<Vec<ProductId>> {
        self.track_calls.lock().clone()
    }

    /// Number of completed `refresh` calls.
    pub fn refreshes(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// The shared book for a tracked product, for tests that mutate it.
    pub fn shared_book(&self, product_id: &ProductId) -> Option<Arc<SharedBook>> {
        self.books.read().get(product_id).cloned()
    }
}

#[async_trait]
impl OrderBookSource for StubBookSource {
    async fn track(&self, product_ids: &[ProductId]) -> Result<()> {
        self.track_calls.lock().push(product_ids.to_vec());
        let mut books = self.books.write();
        for product_id in product_ids {
            let book = SharedBook::new();
            book.replace(bid_ladder(dec!(100), 5), ask_ladder(dec!(101), 5));
            books.insert(product_id.clone(), Arc::new(book));
        }
        Ok(())
    }

    fn order_book(&self, product_id: &ProductId) -> Option<Arc<dyn LiveOrderBook>> {
        self.books
            .read()
            .get(product_id)
            .map(|book| Arc::clone(book) as Arc<dyn LiveOrderBook>)
    }

    async fn refresh(&self) -> Result<usize> {
        let shift = Decimal::from(self.refreshes.fetch_add(1, Ordering::SeqCst) + 1);
        let books = self.books.read();
        for book in books.values() {
            book.replace(
                bid_ladder(dec!(100) + shift, 5),
                ask_ladder(dec!(101) + shift, 5),
            );
        }
        Ok(books.len())
    }
}

/// An [`OrderBookFactory`] implementing only the single-product form.
///
/// Batches therefore go through the trait's default, one product at a time.
pub struct StubBookFactory {
    catalog: Arc<dyn ProductCatalog>,
    source: Arc<StubBookSource>,
    calls: Arc<AtomicU32>,
}

impl StubBookFactory {
    pub fn new(catalog: Arc<dyn ProductCatalog>, source: Arc<StubBookSource>) -> Self {
        Self {
            catalog,
            source,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Number of single-product builds so far.
    pub fn calls(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl OrderBookFactory for StubBookFactory {
    async fn make_order_book(&self, product_id: &ProductId) -> Result<ProductOrderBook> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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
