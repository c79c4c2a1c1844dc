use std::io::Write;

use tempfile::NamedTempFile;

use zcoins::adapter::inbound::cli::load_config;
use zcoins::domain::ProductId;
use zcoins::error::{ConfigError, Error};
use zcoins::infrastructure::config::{Config, ExchangeKind};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn full_file_loads() {
    let file = write_config(
        r#"
exchange = "binance"
products = ["BTCUSDT", "ETHBTC"]

[coinbase]
rest_url = "https://api-public.sandbox.exchange.coinbase.com"
ws_url = "wss://ws-feed-public.sandbox.exchange.coinbase.com"

[binance]
depth_limit = 20
request_timeout_ms = 3000

[dispatch]
channel_capacity = 64

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.exchange, ExchangeKind::Binance);
    assert_eq!(
        config.product_ids().unwrap(),
        vec![ProductId::from("BTCUSDT"), ProductId::from("ETHBTC")]
    );
    assert!(config.coinbase.rest_url.contains("sandbox"));
    assert_eq!(config.coinbase.request_timeout_ms, 10_000);
    assert_eq!(config.binance.depth_limit, 20);
    assert_eq!(config.binance.request_timeout_ms, 3_000);
    assert_eq!(config.dispatch.channel_capacity, 64);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))), "{err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("exchange = [\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))), "{err}");
}

#[test]
fn unknown_exchange_is_rejected() {
    let file = write_config("exchange = \"kraken\"\n");
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn zero_capacity_is_rejected() {
    let file = write_config("[dispatch]\nchannel_capacity = 0\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(
        err.to_string().contains("dispatch.channel_capacity"),
        "{err}"
    );
}

#[test]
fn http_feed_url_is_rejected() {
    let file = write_config("[coinbase]\nws_url = \"https://ws-feed.exchange.coinbase.com\"\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("coinbase.ws_url"), "{err}");
}

#[test]
fn malformed_product_is_rejected() {
    let file = write_config("products = [\"BTC/USD\"]\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(err.is_usage(), "{err}");
}

#[test]
fn explicit_path_wins_over_defaults() {
    let file = write_config("exchange = \"binance\"\n");
    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.exchange, ExchangeKind::Binance);
}
