//! Order book types for market depth representation.
//!
//! This module provides types for representing order book state:
//!
//! - [`PriceLevel`] - A single price level with size
//! - [`BookSnapshot`] - Bids and asks read from a live book
//! - [`SharedBook`] - An in-memory book that can be replaced wholesale
//!
//! # Order Book Structure
//!
//! An order book has two sides:
//! - **Bids**: Buy orders, sorted by price descending (best bid first)
//! - **Asks**: Sell orders, sorted by price ascending (best ask first)
//!
//! # Examples
//!
//! ```
//! use zcoins::domain::{PriceLevel, SharedBook};
//! use rust_decimal_macros::dec;
//!
//! let book = SharedBook::new();
//! book.replace(
//!     vec![PriceLevel::new(dec!(1.00), dec!(5)), PriceLevel::new(dec!(1.06), dec!(3))],
//!     vec![PriceLevel::new(dec!(1.07), dec!(2))],
//! );
//!
//! assert_eq!(book.bids(Some(1))[0].price(), dec!(1.06));
//! assert_eq!(book.asks(None).len(), 1);
//! ```

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;

/// A single price level in an order book.
///
/// Represents aggregated orders at a specific price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    /// The price at this level, in quote currency.
    price: Decimal,
    /// Total size available at this price, in base currency.
    size: Decimal,
}

impl PriceLevel {
    /// Creates a new price level.
    #[must_use]
    pub const fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Returns the price at this level.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the total size available at this level.
    #[must_use]
    pub const fn size(&self) -> Decimal {
        self.size
    }

    /// Returns the level as a `(price, size)` pair.
    #[must_use]
    pub const fn as_tuple(&self) -> (Decimal, Decimal) {
        (self.price, self.size)
    }
}

impl From<(Decimal, Decimal)> for PriceLevel {
    fn from((price, size): (Decimal, Decimal)) -> Self {
        Self::new(price, size)
    }
}

/// Bids and asks read from a live book.
///
/// The two sides are read separately and may not reflect the same instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    /// Sorted by price descending.
    pub bids: Vec<PriceLevel>,
    /// Sorted by price ascending.
    pub asks: Vec<PriceLevel>,
}

/// Take at most `top_n` levels; `None` takes all of them.
fn top(levels: &[PriceLevel], top_n: Option<usize>) -> Vec<PriceLevel> {
    let n = top_n.unwrap_or(levels.len()).min(levels.len());
    levels[..n].to_vec()
}

#[derive(Debug, Default)]
struct Sides {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

/// Thread-safe in-memory order book.
///
/// Holds whole-book snapshots; it applies no incremental updates. Each
/// [`replace`](Self::replace) sorts its input so reads always see bids
/// descending and asks ascending.
#[derive(Debug, Default)]
pub struct SharedBook {
    sides: RwLock<Sides>,
}

impl SharedBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both sides with a fresh snapshot.
    pub fn replace(&self, mut bids: Vec<PriceLevel>, mut asks: Vec<PriceLevel>) {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        let mut sides = self.sides.write();
        sides.bids = bids;
        sides.asks = asks;
    }

    /// Best `top_n` bids, highest price first.
    #[must_use]
    pub fn bids(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        top(&self.sides.read().bids, top_n)
    }

    /// Best `top_n` asks, lowest price first.
    #[must_use]
    pub fn asks(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        top(&self.sides.read().asks, top_n)
    }

    /// Number of `(bid, ask)` levels currently held.
    #[must_use]
    pub fn depth(&self) -> (usize, usize) {
        let sides = self.sides.read();
        (sides.bids.len(), sides.asks.len())
    }
}
