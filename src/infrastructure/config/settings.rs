//! Application configuration loading and validation.
//!
//! # Example
//!
//! ```no_run
//! use zcoins::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("zcoins.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::adapter::outbound::binance::BinanceConfig;
use crate::adapter::outbound::coinbase::CoinbaseConfig;
use crate::domain::ProductId;
use crate::error::{ConfigError, Result};

/// Supported exchanges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    #[default]
    Coinbase,
    Binance,
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coinbase => write!(f, "coinbase"),
            Self::Binance => write!(f, "binance"),
        }
    }
}

/// Ticker dispatch settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Capacity of the channel between the feed and the dispatcher task.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

const fn default_channel_capacity() -> usize {
    1024
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Exchange used when the command line does not choose one.
    #[serde(default)]
    pub exchange: ExchangeKind,

    /// Products tracked when the command line names none.
    #[serde(default)]
    pub products: Vec<String>,

    #[serde(default)]
    pub coinbase: CoinbaseConfig,

    #[serde(default)]
    pub binance: BinanceConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Configured default products, validated.
    pub fn product_ids(&self) -> Result<Vec<ProductId>> {
        self.products
            .iter()
            .map(|p| ProductId::parse(p).map_err(Into::into))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.coinbase.rest_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "coinbase.rest_url",
            }
            .into());
        }
        if self.coinbase.ws_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "coinbase.ws_url",
            }
            .into());
        }
        let ws_url = url::Url::parse(&self.coinbase.ws_url).map_err(|e| {
            ConfigError::InvalidValue {
                field: "coinbase.ws_url",
                reason: e.to_string(),
            }
        })?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                field: "coinbase.ws_url",
                reason: format!("expected ws:// or wss://, got {}://", ws_url.scheme()),
            }
            .into());
        }
        if self.binance.rest_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "binance.rest_url",
            }
            .into());
        }
        for (field, value) in [
            ("coinbase.request_timeout_ms", self.coinbase.request_timeout_ms),
            ("coinbase.connect_timeout_ms", self.coinbase.connect_timeout_ms),
            ("binance.request_timeout_ms", self.binance.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if self.binance.depth_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "binance.depth_limit",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.dispatch.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        self.product_ids()?;
        Ok(())
    }
}
