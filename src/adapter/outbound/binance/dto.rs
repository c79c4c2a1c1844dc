//! Binance REST payloads.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{PriceLevel, Product};

/// Body of `GET /api/v3/exchangeInfo`.
#[derive(Debug, Deserialize)]
pub struct BinanceExchangeInfo {
    pub symbols: Vec<BinanceSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbol {
    pub symbol: String,
    #[serde(default)]
    pub status: Option<String>,
    pub base_asset: String,
    pub quote_asset: String,
}

impl From<BinanceSymbol> for Product {
    fn from(s: BinanceSymbol) -> Self {
        Product::resolved(s.symbol, s.base_asset, s.quote_asset)
    }
}

/// Body of `GET /api/v3/depth`. Levels are `[price, quantity]`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDepth {
    pub last_update_id: u64,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

impl BinanceDepth {
    #[must_use]
    pub fn into_levels(self) -> (Vec<PriceLevel>, Vec<PriceLevel>) {
        (
            self.bids.into_iter().map(PriceLevel::from).collect(),
            self.asks.into_iter().map(PriceLevel::from).collect(),
        )
    }
}

/// Error body, e.g. `{"code":-1121,"msg":"Invalid symbol."}`.
#[derive(Debug, Deserialize)]
pub struct BinanceError {
    pub code: i64,
    pub msg: String,
}
