//! Binance exchange configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    /// REST API base URL.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Levels requested per side from `/api/v3/depth`.
    #[serde(default = "default_depth_limit")]
    pub depth_limit: u32,
    /// Period of the depth refresh in milliseconds. 0 disables it.
    #[serde(default = "default_book_refresh_ms")]
    pub book_refresh_ms: u64,
}

fn default_rest_url() -> String {
    "https://api.binance.com".into()
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_depth_limit() -> u32 {
    100
}

const fn default_book_refresh_ms() -> u64 {
    2_000
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            request_timeout_ms: default_request_timeout_ms(),
            depth_limit: default_depth_limit(),
            book_refresh_ms: default_book_refresh_ms(),
        }
    }
}
