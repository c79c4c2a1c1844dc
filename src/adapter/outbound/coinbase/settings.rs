//! Coinbase exchange configuration.

use serde::Deserialize;

/// Endpoints and timeouts for the Coinbase adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseConfig {
    /// REST API base URL.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Market data WebSocket URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Per-request timeout in milliseconds. Also bounds the initial fetches.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Connect timeout in milliseconds, for both HTTP and WebSocket.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Period of the level-2 snapshot refresh in milliseconds. 0 disables it.
    #[serde(default = "default_book_refresh_ms")]
    pub book_refresh_ms: u64,
}

fn default_rest_url() -> String {
    "https://api.exchange.coinbase.com".into()
}

fn default_ws_url() -> String {
    "wss://ws-feed.exchange.coinbase.com".into()
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_book_refresh_ms() -> u64 {
    1_000
}

impl Default for CoinbaseConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            ws_url: default_ws_url(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            book_refresh_ms: default_book_refresh_ms(),
        }
    }
}
