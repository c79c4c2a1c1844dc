//! Outbound ports: contracts with exchange clients.

pub mod book;
pub mod catalog;
pub mod feed;
pub mod trading;

pub use book::{LiveOrderBook, OrderBookFactory, OrderBookSource, ProductOrderBook};
pub use catalog::{ProductCatalog, ProductFetcher};
pub use feed::{RawTicker, TickerFeed};
pub use trading::{AccountCapability, TradingCapability};
