//! CLI integration tests.

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn zcoins() -> Command {
    let mut cmd = cargo_bin_cmd!("zcoins");
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

/// A config pointing both exchanges at a closed local port.
fn unreachable_config() -> NamedTempFile {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    write_config(&format!(
        r#"
[coinbase]
rest_url = "http://{addr}"
ws_url = "ws://{addr}/ws"
request_timeout_ms = 500
connect_timeout_ms = 500

[binance]
rest_url = "http://{addr}"
request_timeout_ms = 500
"#
    ))
}

#[test]
fn help_lists_commands() {
    zcoins()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("zcoins"))
        .stdout(predicate::str::contains("products"))
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn version() {
    zcoins()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zcoins"));
}

#[test]
fn malformed_product_id_is_rejected_by_the_parser() {
    zcoins()
        .args(["book", "BTC/USD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected character"));
}

#[test]
fn unknown_exchange_is_rejected_by_the_parser() {
    zcoins()
        .args(["--exchange", "kraken", "products"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kraken"));
}

#[test]
fn missing_config_file_fails() {
    zcoins()
        .args(["--config", "/definitely/not/here/zcoins.toml", "products"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn invalid_config_fails_before_any_request() {
    let file = write_config("[dispatch]\nchannel_capacity = 0\n");
    zcoins()
        .arg("--config")
        .arg(file.path())
        .arg("products")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dispatch.channel_capacity"));
}

#[test]
fn watch_on_binance_is_unsupported() {
    let file = unreachable_config();
    zcoins()
        .arg("--config")
        .arg(file.path())
        .args(["--exchange", "binance", "watch", "BTCUSDT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("binance does not support ticker streaming"));
}

#[test]
fn watch_without_products_fails() {
    let file = unreachable_config();
    zcoins()
        .arg("--config")
        .arg(file.path())
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no products given"));
}

#[test]
fn unreachable_exchange_fails() {
    let file = unreachable_config();
    zcoins()
        .arg("--config")
        .arg(file.path())
        .args(["book", "BTC-USD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
