//! Infrastructure layer.
//!
//! Configuration loading and the composition root that wires adapters into
//! exchange facades.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Exchange construction from configuration

pub mod config;
pub mod factory;

pub use factory::{ExchangeFactory, TickerMode};
