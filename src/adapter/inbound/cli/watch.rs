//! Handler for the `watch` command.
//!
//! Streams ticker messages until the feed closes. Ctrl-C is handled by the
//! binary, which drops this future and with it the exchange.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::inbound::cli::command::WatchArgs;
use crate::adapter::inbound::cli::output;
use crate::application::TickerCallback;
use crate::domain::{Product, ProductId, TickerMessage};
use crate::error::{Result, UsageError};
use crate::infrastructure::config::{Config, ExchangeKind};
use crate::infrastructure::{ExchangeFactory, TickerMode};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub async fn execute(config: &Config, kind: ExchangeKind, args: &WatchArgs) -> Result<()> {
    if !ExchangeFactory::supports_tickers(kind) {
        return Err(UsageError::Unsupported {
            exchange: kind.to_string(),
            operation: "ticker streaming",
        }
        .into());
    }
    let ids = watched_products(config, args)?;

    let exchange = ExchangeFactory::create(config, kind, &ids, TickerMode::Stream).await?;
    let print: TickerCallback = Arc::new(
        |exchange: &str, message: &TickerMessage| -> anyhow::Result<()> {
            output::ticker(exchange, message);
            Ok(())
        },
    );
    exchange.add_ticker_callback(print, args.base.as_deref().map(Product::with_base));
    info!(exchange = exchange.name(), products = ids.len(), "Watching tickers");

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    while exchange.has_ticker_feed() {
        interval.tick().await;
    }

    info!(exchange = exchange.name(), "Ticker feed closed");
    exchange.shutdown();
    Ok(())
}

/// Products named on the command line, else the configured ones.
fn watched_products(config: &Config, args: &WatchArgs) -> Result<Vec<ProductId>> {
    let ids = if args.product_ids.is_empty() {
        config.product_ids()?
    } else {
        args.product_ids.clone()
    };
    if ids.is_empty() {
        return Err(UsageError::NoProducts.into());
    }
    Ok(ids)
}
