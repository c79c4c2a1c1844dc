//! Product metadata ports.
//!
//! [`ProductFetcher`] is the contract a wrapped exchange client fulfils: raw,
//! uncached lookups. [`ProductCatalog`] is the capability the rest of the
//! crate consumes; the application layer implements it with a cache in front
//! of a fetcher.

use async_trait::async_trait;

use crate::domain::{Product, ProductId};
use crate::error::{LookupError, Result};

/// Uncached product lookups against an exchange.
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    /// Compose the exchange's product id for a currency pair. No I/O.
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId;

    /// Fetch one product's metadata.
    ///
    /// Returns a fully-resolved product, or a lookup error if the exchange
    /// does not list `product_id`.
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product>;

    /// Fetch every product the exchange lists.
    async fn fetch_all_products(&self) -> Result<Vec<Product>>;

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}

#[async_trait]
impl<T: ProductFetcher + ?Sized> ProductFetcher for std::sync::Arc<T> {
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId {
        (**self).make_product_id(base_currency, quote_currency)
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product> {
        (**self).fetch_product(product_id).await
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        (**self).fetch_all_products().await
    }

    fn exchange_name(&self) -> &'static str {
        (**self).exchange_name()
    }
}

/// Product metadata lookups, cached.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId;

    /// Cached product lookup; performs one fetch on a miss.
    async fn get_product(&self, product_id: &ProductId) -> Result<Product>;

    /// Every listed product. Fetched once, then served from the cache until
    /// [`clear_cache`](Self::clear_cache).
    async fn get_all_products(&self) -> Result<Vec<Product>>;

    /// Drop every cached entry and forget that the full listing was fetched.
    fn clear_cache(&self);

    async fn get_base_currency(&self, product_id: &ProductId) -> Result<String> {
        self.get_product(product_id)
            .await?
            .base_currency
            .ok_or_else(|| unresolved(product_id, "base currency"))
    }

    async fn get_quote_currency(&self, product_id: &ProductId) -> Result<String> {
        self.get_product(product_id)
            .await?
            .quote_currency
            .ok_or_else(|| unresolved(product_id, "quote currency"))
    }

    /// Compare `product_id`'s metadata with `pattern`, exactly or fuzzily.
    async fn product_matches(
        &self,
        product_id: &ProductId,
        pattern: &Product,
        full_match: bool,
    ) -> Result<bool> {
        let product = self.get_product(product_id).await?;
        Ok(if full_match {
            &product == pattern
        } else {
            product.partial_match(pattern)
        })
    }
}

fn unresolved(product_id: &ProductId, field: &'static str) -> crate::error::Error {
    LookupError::UnresolvedProduct {
        product_id: product_id.to_string(),
        field,
    }
    .into()
}
