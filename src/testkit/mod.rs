//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`catalog`] - [`StubFetcher`](catalog::StubFetcher), an in-memory
//!   [`ProductFetcher`](crate::port::ProductFetcher) with call counters.
//! - [`book`] - [`StubBookSource`](book::StubBookSource) and
//!   [`StubBookFactory`](book::StubBookFactory).
//! - [`feed`] - [`ChannelFeed`](feed::ChannelFeed), a ticker feed controlled
//!   through a handle.
//! - [`trading`] - [`StubTrading`](trading::StubTrading) and
//!   [`StubCoinbaseClient`](trading::StubCoinbaseClient).
//! - [`domain`] - Builders for domain primitives.

pub mod book;
pub mod catalog;
pub mod domain;
pub mod feed;
pub mod trading;
