//! Coinbase REST and WebSocket payloads.
//!
//! Numeric fields arrive as JSON strings; `rust_decimal` parses them directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountId, OrderSide, OrderType, PriceLevel, Product};
use crate::port::RawTicker;

/// Entry of `GET /products` and body of `GET /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseProduct {
    pub id: String,
    pub base_currency: String,
    pub quote_currency: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<CoinbaseProduct> for Product {
    fn from(p: CoinbaseProduct) -> Self {
        Product::resolved(p.id, p.base_currency, p.quote_currency)
    }
}

/// Body of `GET /products/{id}/book?level=2`.
///
/// Each level is `[price, size, num_orders]`.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseBook {
    #[serde(default)]
    pub sequence: Option<u64>,
    pub bids: Vec<(Decimal, Decimal, serde_json::Value)>,
    pub asks: Vec<(Decimal, Decimal, serde_json::Value)>,
}

impl CoinbaseBook {
    /// Bids and asks as domain levels, in the order received.
    #[must_use]
    pub fn into_levels(self) -> (Vec<PriceLevel>, Vec<PriceLevel>) {
        fn convert(levels: Vec<(Decimal, Decimal, serde_json::Value)>) -> Vec<PriceLevel> {
            levels
                .into_iter()
                .map(|(price, size, _)| PriceLevel::new(price, size))
                .collect()
        }
        (convert(self.bids), convert(self.asks))
    }
}

/// A currency account as returned by the authenticated client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoinbaseAccount {
    pub id: String,
    pub currency: String,
    pub balance: Decimal,
    pub hold: Decimal,
    pub available: Decimal,
}

impl From<CoinbaseAccount> for Account {
    fn from(a: CoinbaseAccount) -> Self {
        Account {
            account_id: AccountId::new(a.id),
            currency: a.currency,
            balance: a.balance,
            hold: a.hold,
            available: a.available,
        }
    }
}

/// Order side as Coinbase spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinbaseSide {
    Buy,
    Sell,
}

impl From<OrderSide> for CoinbaseSide {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Buy,
            OrderSide::Sell => Self::Sell,
        }
    }
}

impl From<CoinbaseSide> for OrderSide {
    fn from(side: CoinbaseSide) -> Self {
        match side {
            CoinbaseSide::Buy => Self::Buy,
            CoinbaseSide::Sell => Self::Sell,
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinbaseOrderRequest {
    pub product_id: String,
    pub side: CoinbaseSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funds: Option<Decimal>,
}

/// Order as acknowledged by Coinbase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoinbaseOrder {
    pub id: String,
    pub product_id: String,
    pub side: CoinbaseSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub size: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub funds: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Subscription request for the WebSocket feed.
#[derive(Debug, Serialize)]
pub struct CoinbaseSubscribe {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub product_ids: Vec<String>,
    pub channels: Vec<&'static str>,
}

impl CoinbaseSubscribe {
    pub fn ticker(product_ids: Vec<String>) -> Self {
        Self {
            msg_type: "subscribe",
            product_ids,
            channels: vec!["ticker"],
        }
    }
}

/// Messages received on the WebSocket feed.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CoinbaseWsMessage {
    Ticker(RawTicker),
    Subscriptions {
        #[serde(default)]
        channels: Vec<serde_json::Value>,
    },
    Error {
        #[serde(default)]
        message: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn product_converts_to_resolved_product() {
        let json = r#"{"id":"BTC-USD","base_currency":"BTC","quote_currency":"USD",
                       "display_name":"BTC/USD","status":"online","base_increment":"0.00000001"}"#;
        let product: Product = serde_json::from_str::<CoinbaseProduct>(json).unwrap().into();
        assert_eq!(product, Product::resolved("BTC-USD", "BTC", "USD"));
    }

    #[test]
    fn book_levels_parse_from_strings() {
        let json = r#"{"sequence":3,"bids":[["295.96","4.39088265",2]],"asks":[["295.97","25.23542881",12]]}"#;
        let (bids, asks) = serde_json::from_str::<CoinbaseBook>(json).unwrap().into_levels();
        assert_eq!(bids, vec![PriceLevel::new(dec!(295.96), dec!(4.39088265))]);
        assert_eq!(asks[0].size(), dec!(25.23542881));
    }

    #[test]
    fn account_decimals_parse() {
        let json = r#"{"id":"71452118","currency":"BTC","balance":"1.10","hold":"0.10","available":"1.00","profile_id":"p"}"#;
        let account: Account = serde_json::from_str::<CoinbaseAccount>(json).unwrap().into();
        assert!(account.is_consistent());
        assert_eq!(account.account_id.as_str(), "71452118");
    }

    #[test]
    fn order_request_skips_absent_amounts() {
        let request = CoinbaseOrderRequest {
            product_id: "BTC-USD".into(),
            side: OrderSide::Sell.into(),
            order_type: OrderType::Market,
            price: None,
            size: None,
            funds: Some(dec!(10)),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "market");
        assert_eq!(json["side"], "sell");
        assert!(json.get("size").is_none());
        assert!(json.get("funds").is_some());
    }

    #[test]
    fn subscribe_message_shape() {
        let json = serde_json::to_value(CoinbaseSubscribe::ticker(vec!["ETH-USD".into()])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type":"subscribe","product_ids":["ETH-USD"],"channels":["ticker"]})
        );
    }

    #[test]
    fn ticker_message_parses() {
        let json = r#"{"type":"ticker","sequence":5928281084,"product_id":"BTC-USD","price":"61250.10",
                       "open_24h":"60000","side":"sell","time":"2024-03-01T12:00:00.123456Z",
                       "trade_id":1,"last_size":"0.015","best_bid":"61250.00","best_ask":"61250.10"}"#;
        match serde_json::from_str::<CoinbaseWsMessage>(json).unwrap() {
            CoinbaseWsMessage::Ticker(raw) => {
                assert_eq!(raw.product_id.as_str(), "BTC-USD");
                assert_eq!(raw.last_size, dec!(0.015));
            }
            other => panic!("expected ticker, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_messages_are_other() {
        let json = r#"{"type":"heartbeat","sequence":1,"last_trade_id":2,"product_id":"BTC-USD"}"#;
        assert!(matches!(
            serde_json::from_str::<CoinbaseWsMessage>(json).unwrap(),
            CoinbaseWsMessage::Other
        ));
    }
}
