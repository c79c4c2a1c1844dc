//! In-memory product fetcher.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::domain::sample_products;
use crate::domain::{Product, ProductId};
use crate::error::{LookupError, Result};
use crate::port::ProductFetcher;

/// Shared call counters, usable after the fetcher moved into a catalog.
#[derive(Debug, Clone, Default)]
pub struct FetchCounters {
    single: Arc<AtomicU32>,
    bulk: Arc<AtomicU32>,
}

impl FetchCounters {
    /// How many single-product lookups reached the fetcher.
    pub fn single(&self) -> u32 {
        self.single.load(Ordering::SeqCst)
    }

    /// How many full listings reached the fetcher.
    pub fn bulk(&self) -> u32 {
        self.bulk.load(Ordering::SeqCst)
    }
}

/// A [`ProductFetcher`] serving a fixed product list.
///
/// Ids compose as `BASE-QUOTE`. Unknown ids fail with
/// [`LookupError::UnknownProduct`].
pub struct StubFetcher {
    products: BTreeMap<ProductId, Product>,
    counters: FetchCounters,
    delay: Option<Duration>,
}

impl StubFetcher {
    pub fn new(products: Vec<Product>) -> Self {
        let products = products
            .into_iter()
            .filter_map(|p| p.product_id.clone().map(|id| (id, p)))
            .collect();
        Self {
            products,
            counters: FetchCounters::default(),
            delay: None,
        }
    }

    /// Serves [`sample_products`].
    pub fn sample() -> Self {
        Self::new(sample_products())
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn counters(&self) -> FetchCounters {
        self.counters.clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ProductFetcher for StubFetcher {
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId {
        ProductId::new(format!("{base_currency}-{quote_currency}"))
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product> {
        self.counters.single.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.products.get(product_id).cloned().ok_or_else(|| {
            LookupError::UnknownProduct {
                product_id: product_id.to_string(),
            }
            .into()
        })
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        self.counters.bulk.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.products.values().cloned().collect())
    }

    fn exchange_name(&self) -> &'static str {
        "stub"
    }
}
