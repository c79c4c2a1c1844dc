//! Order-book ports.
//!
//! Live book state is owned by an external source ([`OrderBookSource`]); this
//! crate only holds typed views over it ([`ProductOrderBook`]). Views are
//! built by an exchange-specific [`OrderBookFactory`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BookSnapshot, PriceLevel, Product, ProductId, SharedBook};
use crate::error::Result;

/// A book maintained outside this crate.
///
/// Every read reflects the book at call time.
pub trait LiveOrderBook: Send + Sync {
    /// Up to `top_n` bids, highest price first. `None` returns full depth.
    fn bids(&self, top_n: Option<usize>) -> Vec<PriceLevel>;

    /// Up to `top_n` asks, lowest price first. `None` returns full depth.
    fn asks(&self, top_n: Option<usize>) -> Vec<PriceLevel>;
}

impl LiveOrderBook for SharedBook {
    fn bids(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        SharedBook::bids(self, top_n)
    }

    fn asks(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        SharedBook::asks(self, top_n)
    }
}

/// The external component that owns live books for many products.
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    /// Start tracking every product in `product_ids` in one request.
    async fn track(&self, product_ids: &[ProductId]) -> Result<()>;

    /// The live book for a tracked product.
    fn order_book(&self, product_id: &ProductId) -> Option<Arc<dyn LiveOrderBook>>;

    /// Bring every tracked book up to date with the exchange. Returns how
    /// many books were updated.
    ///
    /// Sources updated by push need nothing here; the default does nothing.
    async fn refresh(&self) -> Result<usize> {
        Ok(0)
    }
}

/// Read-only view over one product's live book.
#[derive(Clone)]
pub struct ProductOrderBook {
    product_id: ProductId,
    base_currency: String,
    quote_currency: String,
    book: Arc<dyn LiveOrderBook>,
}

impl ProductOrderBook {
    pub fn new(
        product_id: ProductId,
        base_currency: impl Into<String>,
        quote_currency: impl Into<String>,
        book: Arc<dyn LiveOrderBook>,
    ) -> Self {
        Self {
            product_id,
            base_currency: base_currency.into(),
            quote_currency: quote_currency.into(),
            book,
        }
    }

    #[must_use]
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    #[must_use]
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    #[must_use]
    pub fn quote_currency(&self) -> &str {
        &self.quote_currency
    }

    /// The resolved product this book belongs to.
    #[must_use]
    pub fn product(&self) -> Product {
        Product::resolved(
            self.product_id.clone(),
            self.base_currency.clone(),
            self.quote_currency.clone(),
        )
    }

    /// Bids sorted high to low, prices in quote currency.
    ///
    /// Returns fewer than `top_n` levels when the book is shallower.
    #[must_use]
    pub fn bids(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        let mut levels = self.book.bids(top_n);
        if let Some(n) = top_n {
            levels.truncate(n);
        }
        levels
    }

    /// Asks sorted low to high, prices in quote currency.
    #[must_use]
    pub fn asks(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        let mut levels = self.book.asks(top_n);
        if let Some(n) = top_n {
            levels.truncate(n);
        }
        levels
    }

    /// Both sides. Two separate reads, so not atomic under concurrent updates.
    #[must_use]
    pub fn book(&self, top_n: Option<usize>) -> BookSnapshot {
        BookSnapshot {
            bids: self.bids(top_n),
            asks: self.asks(top_n),
        }
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids(Some(1)).into_iter().next()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks(Some(1)).into_iter().next()
    }
}

impl fmt::Debug for ProductOrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductOrderBook")
            .field("product_id", &self.product_id)
            .field("base_currency", &self.base_currency)
            .field("quote_currency", &self.quote_currency)
            .finish_non_exhaustive()
    }
}

/// Builds [`ProductOrderBook`] views for an exchange.
///
/// Implementations subscribe or allocate the external book here.
#[async_trait]
pub trait OrderBookFactory: Send + Sync {
    /// Build the view for a single product.
    async fn make_order_book(&self, product_id: &ProductId) -> Result<ProductOrderBook>;

    /// Build views for many products, in input order.
    ///
    /// The default calls [`make_order_book`](Self::make_order_book) once per
    /// product. Override it when the source can track a batch in one request.
    async fn make_order_books(&self, product_ids: &[ProductId]) -> Result<Vec<ProductOrderBook>> {
        let mut books = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            books.push(self.make_order_book(product_id).await?);
        }
        Ok(books)
    }

    /// Refresh the source behind every view built so far.
    async fn refresh_order_books(&self) -> Result<usize> {
        Ok(0)
    }
}
