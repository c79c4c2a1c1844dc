//! zcoins - one interface over crypto exchange products, order books,
//! accounts and ticker streams.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Exchange-agnostic values: products, levels, orders,
//!   accounts and ticker messages
//! - **`port`** - Traits the application needs from an exchange
//!   (product fetching, live books, ticker feeds, trading)
//! - **`application`** - The [`Exchange`](application::Exchange) facade, the
//!   product cache, the order-book registry and ticker dispatch
//! - **`adapter`** - Coinbase and Binance implementations of the ports, plus
//!   the command-line front end
//! - **`infrastructure`** - Configuration and exchange construction
//!
//! # Example
//!
//! ```no_run
//! use zcoins::infrastructure::config::{Config, ExchangeKind};
//! use zcoins::infrastructure::{ExchangeFactory, TickerMode};
//! use zcoins::domain::ProductId;
//!
//! # async fn demo() -> zcoins::error::Result<()> {
//! let config = Config::default();
//! let ids = [ProductId::from("BTC-USD")];
//! let exchange = ExchangeFactory::create(&config, ExchangeKind::Coinbase, &ids, TickerMode::Off).await?;
//! let book = exchange.get_order_book(&ids[0])?;
//! println!("{} best bid {:?}", book.product_id(), book.best_bid());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
