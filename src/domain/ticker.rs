//! Ticker events delivered to subscribers.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use super::order::OrderSide;
use super::product::Product;

/// A single trade or best-quote update for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMessage {
    pub product: Product,
    pub time: DateTime<Utc>,
    /// Taker side of the last trade.
    pub order_side: OrderSide,
    pub last_size: Decimal,
    pub price: Decimal,
    pub best_bid: Decimal,
    pub best_ask: Decimal,
}

impl TickerMessage {
    /// Distance between the best ask and the best bid.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.best_ask - self.best_bid
    }
}

impl fmt::Display for TickerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} {} @ {}",
            self.product
                .product_id
                .as_ref()
                .map_or("?", |id| id.as_str()),
            self.time.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.order_side,
            self.last_size,
            self.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn message() -> TickerMessage {
        TickerMessage {
            product: Product::resolved("BTC-USD", "BTC", "USD"),
            time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            order_side: OrderSide::Sell,
            last_size: dec!(0.015),
            price: dec!(61250.10),
            best_bid: dec!(61250.00),
            best_ask: dec!(61250.10),
        }
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            message().to_string(),
            "BTC-USD: 2024-03-01T12:00:00.000000Z: SELL 0.015 @ 61250.10"
        );
    }

    #[test]
    fn spread() {
        assert_eq!(message().spread(), dec!(0.10));
    }
}
