//! Exchange factory.
//!
//! Builds an [`Exchange`] for the configured (or requested) exchange.

use tracing::info;

use super::config::{Config, ExchangeKind};
use crate::adapter::outbound::{binance, coinbase};
use crate::application::Exchange;
use crate::domain::ProductId;
use crate::error::Result;

/// Whether the built exchange should stream tickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerMode {
    Off,
    Stream,
}

/// Dispatches to the adapter for an [`ExchangeKind`]. No instance state.
pub struct ExchangeFactory;

impl ExchangeFactory {
    /// Connect to `kind`, tracking `product_ids`.
    ///
    /// [`TickerMode::Stream`] is ignored for exchanges without a ticker feed.
    pub async fn create(
        config: &Config,
        kind: ExchangeKind,
        product_ids: &[ProductId],
        tickers: TickerMode,
    ) -> Result<Exchange> {
        info!(exchange = %kind, products = product_ids.len(), "Creating exchange");
        match kind {
            ExchangeKind::Coinbase => {
                let capacity = match tickers {
                    TickerMode::Stream => Some(config.dispatch.channel_capacity),
                    TickerMode::Off => None,
                };
                coinbase::connect(&config.coinbase, product_ids, capacity).await
            }
            ExchangeKind::Binance => binance::connect(&config.binance, product_ids).await,
        }
    }

    /// Whether `kind` can stream tickers.
    #[must_use]
    pub const fn supports_tickers(kind: ExchangeKind) -> bool {
        matches!(kind, ExchangeKind::Coinbase)
    }
}
