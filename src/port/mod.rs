//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between this crate and the exchange clients it wraps.
//! Each capability is a separate trait so an exchange value can be composed
//! from exactly the capabilities its adapter provides.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │ Exchange / Authenticated │
//!                    │         Exchange         │
//!     ┌──────────────┤   (application layer)    ├─────────────┐
//!     │              └──────────────────────────┘             │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌──────────┐           ┌─────────────┐              ┌────────────┐
//! │ Product  │           │ Order book  │              │  Ticker    │
//! │ Fetcher  │           │ Source      │              │  Feed      │
//! └──────────┘           └─────────────┘              └────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ProductFetcher`], [`ProductCatalog`] - Product metadata
//! - [`OrderBookSource`], [`LiveOrderBook`], [`OrderBookFactory`] - Order books
//! - [`TickerFeed`] - Streaming ticker events
//! - [`AccountCapability`], [`TradingCapability`] - Authenticated operations

pub mod outbound;

pub use outbound::{
    AccountCapability, LiveOrderBook, OrderBookFactory, OrderBookSource, ProductCatalog,
    ProductFetcher, ProductOrderBook, RawTicker, TickerFeed, TradingCapability,
};
