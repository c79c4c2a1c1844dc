//! Product metadata cache.
//!
//! [`CachedCatalog`] fronts a [`ProductFetcher`] with a lazily filled cache:
//!
//! ```text
//!  Empty ──get_product──▶ Partial ──get_all_products──▶ Full
//!    │                                                  ▲
//!    └──────────────get_all_products────────────────────┘
//!  any state ──clear_cache──▶ Empty
//! ```
//!
//! The full listing is fetched once; afterwards `get_all_products` serves the
//! cache. Callers wanting fresh data clear the cache first.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{Product, ProductId};
use crate::error::Result;
use crate::port::{ProductCatalog, ProductFetcher};

/// Observable cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing cached.
    Empty,
    /// Some products cached through single lookups.
    Partial,
    /// The full listing has been fetched.
    Full,
}

#[derive(Debug, Default)]
enum CacheState {
    #[default]
    Empty,
    Partial(BTreeMap<ProductId, Product>),
    Full(BTreeMap<ProductId, Product>),
}

impl CacheState {
    fn status(&self) -> CacheStatus {
        match self {
            Self::Empty => CacheStatus::Empty,
            Self::Partial(_) => CacheStatus::Partial,
            Self::Full(_) => CacheStatus::Full,
        }
    }

    fn get(&self, product_id: &ProductId) -> Option<&Product> {
        match self {
            Self::Empty => None,
            Self::Partial(map) | Self::Full(map) => map.get(product_id),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Partial(map) | Self::Full(map) => map.len(),
        }
    }

    /// Cache one product. A full cache stays full.
    fn insert(&mut self, product_id: ProductId, product: Product) {
        match self {
            Self::Empty => {
                *self = Self::Partial(BTreeMap::from([(product_id, product)]));
            }
            Self::Partial(map) | Self::Full(map) => {
                map.insert(product_id, product);
            }
        }
    }

    /// Merge a full listing, overwriting entries it contains.
    fn fill(&mut self, products: &[Product]) {
        let mut map = match std::mem::take(self) {
            Self::Empty => BTreeMap::new(),
            Self::Partial(map) | Self::Full(map) => map,
        };
        for product in products {
            match &product.product_id {
                Some(id) => {
                    map.insert(id.clone(), product.clone());
                }
                None => warn!(product = %product, "Skipping listed product without an id"),
            }
        }
        *self = Self::Full(map);
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: CacheState,
    /// Bumped by `clear_cache` so fetches started earlier do not repopulate.
    generation: u64,
}

/// A [`ProductCatalog`] caching the answers of a [`ProductFetcher`].
pub struct CachedCatalog<F> {
    fetcher: F,
    inner: RwLock<Inner>,
    /// Serializes cache misses so each id is fetched once.
    fetch_guard: Mutex<()>,
}

impl<F: ProductFetcher> CachedCatalog<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            inner: RwLock::new(Inner::default()),
            fetch_guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn status(&self) -> CacheStatus {
        self.inner.read().state.status()
    }

    /// Number of cached products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn cached(&self, product_id: &ProductId) -> Option<Product> {
        self.inner.read().state.get(product_id).cloned()
    }

    fn generation(&self) -> u64 {
        self.inner.read().generation
    }
}

#[async_trait]
impl<F: ProductFetcher> ProductCatalog for CachedCatalog<F> {
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId {
        self.fetcher.make_product_id(base_currency, quote_currency)
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Product> {
        if let Some(product) = self.cached(product_id) {
            return Ok(product);
        }

        let _guard = self.fetch_guard.lock().await;
        if let Some(product) = self.cached(product_id) {
            return Ok(product);
        }

        let generation = self.generation();
        let product = self.fetcher.fetch_product(product_id).await?;
        debug!(
            exchange = self.fetcher.exchange_name(),
            product_id = %product_id,
            "Cached product metadata"
        );

        let mut inner = self.inner.write();
        if inner.generation == generation {
            inner.state.insert(product_id.clone(), product.clone());
        }
        Ok(product)
    }

    async fn get_all_products(&self) -> Result<Vec<Product>> {
        let _guard = self.fetch_guard.lock().await;
        {
            let inner = self.inner.read();
            if let CacheState::Full(map) = &inner.state {
                return Ok(map.values().cloned().collect());
            }
        }

        let generation = self.generation();
        let products = self.fetcher.fetch_all_products().await?;
        info!(
            exchange = self.fetcher.exchange_name(),
            count = products.len(),
            "Fetched product listing"
        );

        let mut inner = self.inner.write();
        if inner.generation == generation {
            inner.state.fill(&products);
        }
        Ok(products)
    }

    fn clear_cache(&self) {
        let mut inner = self.inner.write();
        inner.state = CacheState::Empty;
        inner.generation += 1;
        debug!(exchange = self.fetcher.exchange_name(), "Product cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::testkit::catalog::StubFetcher;

    fn btc_usd() -> ProductId {
        ProductId::from("BTC-USD")
    }

    #[tokio::test]
    async fn repeated_lookups_fetch_once() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        let first = catalog.get_product(&btc_usd()).await.unwrap();
        let second = catalog.get_product(&btc_usd()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(counters.single(), 1);
        assert_eq!(catalog.status(), CacheStatus::Partial);
    }

    #[tokio::test]
    async fn distinct_ids_fetch_once_each() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        for id in ["BTC-USD", "ETH-USD", "BTC-USD", "ETH-USD", "ETH-BTC"] {
            catalog.get_product(&ProductId::from(id)).await.unwrap();
        }
        assert_eq!(counters.single(), 3);
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn clear_then_lookup_fetches_again() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        catalog.get_product(&btc_usd()).await.unwrap();
        catalog.clear_cache();
        assert_eq!(catalog.status(), CacheStatus::Empty);

        catalog.get_product(&btc_usd()).await.unwrap();
        assert_eq!(counters.single(), 2);
    }

    #[tokio::test]
    async fn full_listing_is_fetched_once() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        let first = catalog.get_all_products().await.unwrap();
        let second = catalog.get_all_products().await.unwrap();

        assert_eq!(counters.bulk(), 1);
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 4);
        assert_eq!(catalog.status(), CacheStatus::Full);
    }

    #[tokio::test]
    async fn full_listing_serves_single_lookups() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        catalog.get_all_products().await.unwrap();
        catalog.get_product(&ProductId::from("ETH-BTC")).await.unwrap();

        assert_eq!(counters.single(), 0);
    }

    #[tokio::test]
    async fn partial_cache_upgrades_to_full() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        catalog.get_product(&btc_usd()).await.unwrap();
        catalog.get_all_products().await.unwrap();

        assert_eq!(catalog.status(), CacheStatus::Full);
        assert_eq!(catalog.len(), 4);
        assert_eq!(counters.bulk(), 1);
    }

    #[tokio::test]
    async fn clear_resets_full_listing() {
        let fetcher = StubFetcher::sample();
        let counters = fetcher.counters();
        let catalog = CachedCatalog::new(fetcher);

        catalog.get_all_products().await.unwrap();
        catalog.clear_cache();
        catalog.get_all_products().await.unwrap();

        assert_eq!(counters.bulk(), 2);
    }

    #[tokio::test]
    async fn unknown_product_is_a_lookup_error_and_not_cached() {
        let catalog = CachedCatalog::new(StubFetcher::sample());

        let err = catalog
            .get_product(&ProductId::from("DOGE-XYZ"))
            .await
            .unwrap_err();
        assert!(err.is_lookup());
        assert_eq!(catalog.status(), CacheStatus::Empty);
    }

    #[tokio::test]
    async fn currency_projections() {
        let catalog = CachedCatalog::new(StubFetcher::sample());
        let id = ProductId::from("ETH-BTC");

        assert_eq!(catalog.get_base_currency(&id).await.unwrap(), "ETH");
        assert_eq!(catalog.get_quote_currency(&id).await.unwrap(), "BTC");
    }

    #[tokio::test]
    async fn product_matches_full_and_partial() {
        let catalog = CachedCatalog::new(StubFetcher::sample());
        let id = btc_usd();

        assert!(catalog
            .product_matches(&id, &Product::with_quote("USD"), false)
            .await
            .unwrap());
        assert!(!catalog
            .product_matches(&id, &Product::with_quote("USD"), true)
            .await
            .unwrap());
        assert!(catalog
            .product_matches(&id, &Product::resolved("BTC-USD", "BTC", "USD"), true)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn concurrent_first_access_fetches_once() {
        let fetcher = StubFetcher::sample().with_delay(Duration::from_millis(20));
        let counters = fetcher.counters();
        let catalog = Arc::new(CachedCatalog::new(fetcher));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                tokio::spawn(async move { catalog.get_product(&btc_usd()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(counters.single(), 1);
    }

    #[tokio::test]
    async fn clear_during_listing_leaves_cache_empty() {
        let fetcher = StubFetcher::sample().with_delay(Duration::from_millis(50));
        let catalog = Arc::new(CachedCatalog::new(fetcher));

        let listing = {
            let catalog = Arc::clone(&catalog);
            tokio::spawn(async move { catalog.get_all_products().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        catalog.clear_cache();

        let products = listing.await.unwrap().unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(catalog.status(), CacheStatus::Empty);
    }

    #[test]
    fn make_product_id_delegates() {
        let catalog = CachedCatalog::new(StubFetcher::sample());
        assert_eq!(catalog.make_product_id("SOL", "USD").as_str(), "SOL-USD");
    }
}
