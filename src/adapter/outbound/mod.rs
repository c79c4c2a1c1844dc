//! Outbound adapters (driven side): one module per exchange.

pub mod binance;
pub mod coinbase;
