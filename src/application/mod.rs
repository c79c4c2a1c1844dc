//! Application services.
//!
//! These compose the outbound ports into the exchange facades: a cached
//! product catalog, the order-book registry and ticker dispatch.

pub mod catalog;
pub mod exchange;
pub mod registry;
pub mod ticker;

pub use catalog::{CacheStatus, CachedCatalog};
pub use exchange::{AuthenticatedExchange, Exchange};
pub use registry::OrderBookRegistry;
pub use ticker::{translate, DispatchReport, TickerCallback, TickerDispatcher, TickerHub};
