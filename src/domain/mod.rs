//! Exchange-agnostic domain types.
//!
//! Plain values shared by every layer: products and patterns, order
//! vocabulary, account balances, ticker events and order-book levels.

mod account;
mod book;
mod id;
mod order;
mod product;
mod ticker;

pub use account::Account;
pub use book::{BookSnapshot, PriceLevel, SharedBook};
pub use id::{AccountId, CallbackId, OrderId, ProductId};
pub use order::{MarketAmount, OrderReport, OrderSide, OrderType};
pub use product::Product;
pub use ticker::TickerMessage;
