//! Command-line front end.
//!
//! Each subcommand has a handler module with an `execute` function taking
//! the loaded [`Config`], the selected exchange and its parsed arguments.

pub mod book;
pub mod command;
pub mod output;
pub mod products;
pub mod watch;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use command::{Cli, Commands};

use crate::error::Result;
use crate::infrastructure::config::Config;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "zcoins.toml";

/// Load `path` when given, else `./zcoins.toml` when present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                Config::load(&fallback)
            } else {
                debug!("No configuration file, using defaults");
                Ok(Config::default())
            }
        }
    }
}

/// Run the parsed command against `config`.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let kind = cli.exchange.unwrap_or(config.exchange);
    match &cli.command {
        Commands::Products(args) => products::execute(config, kind, args).await,
        Commands::Book(args) => book::execute(config, kind, args).await,
        Commands::Watch(args) => watch::execute(config, kind, args).await,
    }
}
