//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ProductId;
use crate::infrastructure::config::ExchangeKind;

/// One interface over crypto exchange products, order books and tickers
#[derive(Parser, Debug)]
#[command(name = "zcoins")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file [default: ./zcoins.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Exchange to use, overriding the configuration
    #[arg(short, long, global = true, value_enum)]
    pub exchange: Option<ExchangeKind>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the products an exchange offers
    Products(ProductsArgs),

    /// Show the top of one product's order book
    Book(BookArgs),

    /// Stream ticker messages until interrupted
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct ProductsArgs {
    /// Only products with this base currency
    #[arg(long)]
    pub base: Option<String>,

    /// Only products with this quote currency
    #[arg(long)]
    pub quote: Option<String>,
}

#[derive(Args, Debug)]
pub struct BookArgs {
    /// Exchange product id, e.g. BTC-USD or BTCUSDT
    #[arg(value_parser = parse_product_id)]
    pub product_id: ProductId,

    /// Levels per side
    #[arg(long, default_value_t = 10)]
    pub depth: usize,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Products to subscribe to [default: configured products]
    #[arg(value_parser = parse_product_id)]
    pub product_ids: Vec<ProductId>,

    /// Only print tickers for this base currency
    #[arg(long)]
    pub base: Option<String>,
}

fn parse_product_id(input: &str) -> Result<ProductId, String> {
    ProductId::parse(input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["zcoins", "book", "BTC-USD", "--exchange", "binance", "--depth", "3"])
            .unwrap();
        assert_eq!(cli.exchange, Some(ExchangeKind::Binance));
        match cli.command {
            Commands::Book(args) => {
                assert_eq!(args.product_id.as_str(), "BTC-USD");
                assert_eq!(args.depth, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_product_id() {
        assert!(Cli::try_parse_from(["zcoins", "book", "BTC/USD"]).is_err());
    }

    #[test]
    fn watch_accepts_many_products() {
        let cli = Cli::try_parse_from(["zcoins", "watch", "BTC-USD", "ETH-USD", "--base", "BTC"]).unwrap();
        match cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.product_ids.len(), 2);
                assert_eq!(args.base.as_deref(), Some("BTC"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
