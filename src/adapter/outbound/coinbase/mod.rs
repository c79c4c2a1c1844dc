//! Coinbase exchange integration.
//!
//! Public endpoints (products, level-2 books, the ticker channel) are spoken
//! directly. Authenticated endpoints go through a [`CoinbaseAuthClient`]
//! supplied by the caller.

pub mod book;
pub mod client;
pub mod dto;
pub mod exchange;
pub mod settings;
pub mod stream;
pub mod trading;

pub use book::{CoinbaseBookFactory, CoinbaseBookSource};
pub use client::CoinbaseClient;
pub use dto::{CoinbaseAccount, CoinbaseOrder, CoinbaseOrderRequest, CoinbaseSide};
pub use exchange::{connect, connect_authenticated, EXCHANGE_NAME};
pub use settings::CoinbaseConfig;
pub use stream::CoinbaseTickerStream;
pub use trading::{CoinbaseAuthClient, CoinbaseTrading};
