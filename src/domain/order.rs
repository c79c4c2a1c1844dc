//! Order vocabulary shared by every exchange.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::product::Product;
use crate::error::Error;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Self::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Self::Sell)
        } else {
            Err(Error::Decode {
                what: "order side",
                reason: format!("expected buy or sell, got '{s}'"),
            })
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
}

impl OrderType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
        }
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "market" => Ok(Self::Market),
            "limit" => Ok(Self::Limit),
            "stop" => Ok(Self::Stop),
            _ => Err(Error::Decode {
                what: "order type",
                reason: format!("unknown order type '{s}'"),
            }),
        }
    }
}

/// How a market order is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketAmount {
    /// Amount of base currency to buy or sell.
    Size(Decimal),
    /// Amount of quote currency to spend or receive.
    Funds(Decimal),
}

/// What was submitted to the exchange. Says nothing about fill state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReport {
    pub order_id: OrderId,
    pub product: Product,
    pub order_side: OrderSide,
    pub order_type: OrderType,
    /// `None` for funds-sized market orders the exchange did not size.
    pub size: Option<Decimal>,
}
