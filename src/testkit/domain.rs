//! Builders for domain primitives used across tests.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{Account, AccountId, OrderSide, PriceLevel, Product, ProductId, TickerMessage};
use crate::port::RawTicker;

/// The products every stub exchange lists.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::resolved("BTC-USD", "BTC", "USD"),
        Product::resolved("ETH-USD", "ETH", "USD"),
        Product::resolved("ETH-BTC", "ETH", "BTC"),
        Product::resolved("BTC-EUR", "BTC", "EUR"),
    ]
}

pub fn product_ids(ids: &[&str]) -> Vec<ProductId> {
    ids.iter().map(|id| ProductId::from(*id)).collect()
}

/// A raw ticker event as a feed would deliver it.
pub fn raw_ticker(product_id: &str, side: &str, price: Decimal) -> RawTicker {
    RawTicker {
        product_id: ProductId::from(product_id),
        time: "2024-03-01T12:00:00.123456Z".into(),
        side: side.into(),
        last_size: dec!(0.01),
        price,
        best_bid: price - dec!(0.01),
        best_ask: price,
    }
}

/// A translated BTC-USD ticker message.
pub fn sample_ticker() -> TickerMessage {
    TickerMessage {
        product: Product::resolved("BTC-USD", "BTC", "USD"),
        time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap_or_default(),
        order_side: OrderSide::Buy,
        last_size: dec!(0.01),
        price: dec!(61250.10),
        best_bid: dec!(61250.00),
        best_ask: dec!(61250.10),
    }
}

/// Bid levels descending from `best`, one unit apart.
pub fn bid_ladder(best: Decimal, levels: usize) -> Vec<PriceLevel> {
    (0..levels)
        .map(|i| PriceLevel::new(best - Decimal::from(i), dec!(1)))
        .collect()
}

/// Ask levels ascending from `best`, one unit apart.
pub fn ask_ladder(best: Decimal, levels: usize) -> Vec<PriceLevel> {
    (0..levels)
        .map(|i| PriceLevel::new(best + Decimal::from(i), dec!(1)))
        .collect()
}

pub fn account(id: &str, currency: &str, balance: Decimal, hold: Decimal) -> Account {
    Account {
        account_id: AccountId::new(id),
        currency: currency.into(),
        balance,
        hold,
        available: balance - hold,
    }
}
