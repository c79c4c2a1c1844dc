//! Order-book registry.
//!
//! Holds one [`ProductOrderBook`] per tracked product, indexed by product id
//! and by base and quote currency. Views are built by an
//! [`OrderBookFactory`]; registering an id again replaces its view in every
//! index.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::ProductId;
use crate::error::{Error, LookupError, Result};
use crate::port::{OrderBookFactory, ProductOrderBook};

#[derive(Default)]
struct Indices {
    by_product: HashMap<ProductId, Arc<ProductOrderBook>>,
    by_base: HashMap<String, Vec<Arc<ProductOrderBook>>>,
    by_quote: HashMap<String, Vec<Arc<ProductOrderBook>>>,
}

impl Indices {
    fn insert(&mut self, book: Arc<ProductOrderBook>) {
        if let Some(previous) = self
            .by_product
            .insert(book.product_id().clone(), Arc::clone(&book))
        {
            unlink(&mut self.by_base, previous.base_currency(), &previous);
            unlink(&mut self.by_quote, previous.quote_currency(), &previous);
        }
        self.by_base
            .entry(book.base_currency().to_string())
            .or_default()
            .push(Arc::clone(&book));
        self.by_quote
            .entry(book.quote_currency().to_string())
            .or_default()
            .push(book);
    }
}

/// Remove `book` from `index[currency]`, dropping the entry once empty.
fn unlink(
    index: &mut HashMap<String, Vec<Arc<ProductOrderBook>>>,
    currency: &str,
    book: &Arc<ProductOrderBook>,
) {
    if let Some(books) = index.get_mut(currency) {
        books.retain(|b| !Arc::ptr_eq(b, book));
        if books.is_empty() {
            index.remove(currency);
        }
    }
}

/// Indexed collection of per-product order-book views.
pub struct OrderBookRegistry {
    factory: Arc<dyn OrderBookFactory>,
    indices: RwLock<Indices>,
}

impl OrderBookRegistry {
    pub fn new(factory: Arc<dyn OrderBookFactory>) -> Self {
        Self {
            factory,
            indices: RwLock::new(Indices::default()),
        }
    }

    /// Register the initial product set. Same path as runtime additions.
    pub async fn initialize(&self, product_ids: &[ProductId]) -> Result<Vec<Arc<ProductOrderBook>>> {
        let books = self.add_order_books(product_ids).await?;
        info!(count = books.len(), "Order book registry initialized");
        Ok(books)
    }

    pub async fn add_order_book(&self, product_id: &ProductId) -> Result<Arc<ProductOrderBook>> {
        let mut books = self.add_order_books(std::slice::from_ref(product_id)).await?;
        books.pop().ok_or(Error::FactoryMismatch {
            requested: 1,
            built: 0,
        })
    }

    /// Build views through the factory and index them. Returns views in
    /// input order.
    pub async fn add_order_books(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Arc<ProductOrderBook>>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let built = self.factory.make_order_books(product_ids).await?;
        if built.len() != product_ids.len() {
            return Err(Error::FactoryMismatch {
                requested: product_ids.len(),
                built: built.len(),
            });
        }

        let books: Vec<_> = built.into_iter().map(Arc::new).collect();
        let mut indices = self.indices.write();
        for book in &books {
            debug!(
                product_id = %book.product_id(),
                base = book.base_currency(),
                quote = book.quote_currency(),
                "Registered order book"
            );
            indices.insert(Arc::clone(book));
        }
        Ok(books)
    }

    /// Ask the factory to refresh every book behind the registered views.
    ///
    /// Views stay registered; their next reads see the refreshed state.
    pub async fn refresh(&self) -> Result<usize> {
        let refreshed = self.factory.refresh_order_books().await?;
        debug!(refreshed, "Order books refreshed");
        Ok(refreshed)
    }

    #[must_use]
    pub fn factory(&self) -> &Arc<dyn OrderBookFactory> {
        &self.factory
    }

    pub fn get_order_book(&self, product_id: &ProductId) -> Result<Arc<ProductOrderBook>> {
        self.indices
            .read()
            .by_product
            .get(product_id)
            .cloned()
            .ok_or_else(|| {
                LookupError::UnknownOrderBook {
                    product_id: product_id.to_string(),
                }
                .into()
            })
    }

    /// Books whose base currency is `currency`, in registration order.
    #[must_use]
    pub fn get_order_books_by_base_currency(&self, currency: &str) -> Vec<Arc<ProductOrderBook>> {
        self.indices
            .read()
            .by_base
            .get(currency)
            .cloned()
            .unwrap_or_default()
    }

    /// Books whose quote currency is `currency`, in registration order.
    #[must_use]
    pub fn get_order_books_by_quote_currency(&self, currency: &str) -> Vec<Arc<ProductOrderBook>> {
        self.indices
            .read()
            .by_quote
            .get(currency)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_tracked_products(&self) -> BTreeSet<ProductId> {
        self.indices.read().by_product.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.read().by_product.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
