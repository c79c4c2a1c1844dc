//! CLI output formatting.
//!
//! Command results go to stdout, either as aligned text or as JSON for
//! scripting. Logs are written to stderr by the tracing subscriber, so the
//! two never interleave on the same stream.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use serde::Serialize;
use serde_json::json;

use crate::domain::{PriceLevel, Product, TickerMessage};
use crate::error::Result;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self { json }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Print `value` as pretty JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one product as an aligned row.
pub fn product_row(product: &Product) {
    println!(
        "  {:<14} {:<8} {:<8}",
        product.product_id.as_ref().map_or("-", |id| id.as_str()),
        product.base_currency.as_deref().unwrap_or("-"),
        product.quote_currency.as_deref().unwrap_or("-"),
    );
}

/// Print a closing summary line.
pub fn summary(message: impl Display) {
    println!();
    println!("{message}");
}

/// Print a section header.
pub fn section(title: impl Display) {
    println!("{title}");
}

/// Print one book level under a side label.
pub fn level(side: &str, level: &PriceLevel) {
    println!("  {side:<4} {:>18} {:>18}", level.price(), level.size());
}

/// Print a ticker event as one line: compact text or a JSON object.
pub fn ticker(exchange: &str, message: &TickerMessage) {
    if is_json() {
        println!("{}", ticker_json(exchange, message));
    } else {
        println!("{exchange} {message}");
    }
}

fn ticker_json(exchange: &str, message: &TickerMessage) -> serde_json::Value {
    json!({
        "exchange": exchange,
        "product_id": message.product.product_id,
        "time": message.time,
        "side": message.order_side.to_string(),
        "last_size": message.last_size,
        "price": message.price,
        "best_bid": message.best_bid,
        "best_ask": message.best_ask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::sample_ticker;

    #[test]
    fn ticker_json_carries_every_field() {
        let value = ticker_json("Coinbase", &sample_ticker());
        assert_eq!(value["exchange"], "Coinbase");
        assert_eq!(value["product_id"], "BTC-USD");
        for key in ["time", "side", "last_size", "price", "best_bid", "best_ask"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn configure_round_trips() {
        configure(OutputConfig::new(false));
        assert!(!is_json());
    }
}
