//! Binance adapter against a mock REST server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use zcoins::adapter::outbound::binance::{self, BinanceClient, BinanceConfig};
use zcoins::domain::{PriceLevel, Product, ProductId};
use zcoins::error::Error;
use zcoins::port::ProductFetcher;

fn symbols() -> Vec<Value> {
    vec![
        json!({"symbol": "BTCUSDT", "status": "TRADING", "baseAsset": "BTC", "quoteAsset": "USDT"}),
        json!({"symbol": "ETHBTC", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "BTC"}),
        json!({"symbol": "ETHUSDT", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "USDT"}),
    ]
}

fn invalid_symbol() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"code": -1121, "msg": "Invalid symbol."})),
    )
        .into_response()
}

async fn exchange_info(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("symbol") {
        None => Json(json!({"timezone": "UTC", "symbols": symbols()})).into_response(),
        Some(wanted) => match symbols().into_iter().find(|s| s["symbol"] == wanted.as_str()) {
            Some(symbol) => Json(json!({"symbols": [symbol]})).into_response(),
            None => invalid_symbol(),
        },
    }
}

async fn depth(Query(query): Query<HashMap<String, String>>) -> Response {
    assert_eq!(query.get("limit").map(String::as_str), Some("5"));
    match query.get("symbol").map(String::as_str) {
        Some("BTCUSDT") => Json(json!({
            "lastUpdateId": 1027024,
            "bids": [["64000.10", "0.40"], ["63999.00", "1.00"]],
            "asks": [["64000.20", "0.25"]]
        }))
        .into_response(),
        Some("ETHBTC") => Json(json!({
            "lastUpdateId": 88,
            "bids": [["0.05200", "12.5"]],
            "asks": [["0.05201", "3.0"]]
        }))
        .into_response(),
        _ => invalid_symbol(),
    }
}

async fn start_mock_server() -> SocketAddr {
    let router = Router::new()
        .route("/api/v3/exchangeInfo", get(exchange_info))
        .route("/api/v3/depth", get(depth))
        .route(
            "/banned/api/v3/exchangeInfo",
            get(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"code": -1003, "msg": "Too many requests."})),
                )
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });
    addr
}

/// Depth whose best bid rises by one on every request.
async fn moving_depth(State(requests): State<Arc<AtomicU64>>) -> Json<Value> {
    let n = requests.fetch_add(1, Ordering::SeqCst);
    let bid = 64_000 + n;
    Json(json!({
        "lastUpdateId": n,
        "bids": [[bid.to_string(), "0.5"]],
        "asks": [[(bid + 1).to_string(), "0.5"]]
    }))
}

async fn start_moving_depth_server() -> (SocketAddr, Arc<AtomicU64>) {
    let requests = Arc::new(AtomicU64::new(0));
    let router = Router::new()
        .route("/api/v3/exchangeInfo", get(exchange_info))
        .route("/api/v3/depth", get(moving_depth))
        .with_state(Arc::clone(&requests));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });
    (addr, requests)
}

fn config(addr: SocketAddr) -> BinanceConfig {
    BinanceConfig {
        rest_url: format!("http://{addr}"),
        request_timeout_ms: 2_000,
        depth_limit: 5,
        book_refresh_ms: 0,
    }
}

#[tokio::test]
async fn client_lists_and_resolves_symbols() {
    let addr = start_mock_server().await;
    let client = BinanceClient::from_config(&config(addr));

    assert_eq!(client.fetch_all_products().await.unwrap().len(), 3);
    assert_eq!(
        client.fetch_product(&ProductId::from("ETHBTC")).await.unwrap(),
        Product::resolved("ETHBTC", "ETH", "BTC")
    );

    let err = client
        .fetch_product(&ProductId::from("NOPEUSDT"))
        .await
        .unwrap_err();
    assert!(err.is_lookup(), "{err}");
}

#[tokio::test]
async fn rate_limit_errors_carry_code_and_message() {
    let addr = start_mock_server().await;
    let client = BinanceClient::new(format!("http://{addr}/banned"));

    match client.fetch_all_products().await.unwrap_err() {
        Error::Exchange { exchange, message } => {
            assert_eq!(exchange, "Binance");
            assert!(message.contains("Too many requests. (-1003)"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn connect_loads_depth_snapshots() {
    let addr = start_mock_server().await;
    let ids = [ProductId::from("BTCUSDT"), ProductId::from("ETHBTC")];
    let exchange = binance::connect(&config(addr), &ids).await.unwrap();

    assert_eq!(exchange.name(), "Binance");
    assert_eq!(exchange.make_product_id("eth", "usdt").as_str(), "ETHUSDT");

    let btc = exchange.get_order_book(&ids[0]).unwrap();
    assert_eq!(btc.best_bid(), Some(PriceLevel::new(dec!(64000.10), dec!(0.40))));
    assert_eq!(btc.best_ask(), Some(PriceLevel::new(dec!(64000.20), dec!(0.25))));

    let by_base = exchange.get_order_books_by_base_currency("ETH");
    assert_eq!(by_base.len(), 1);
    assert_eq!(by_base[0].product_id(), &ids[1]);

    let by_pair = exchange.get_order_book_by_currencies("BTC", "USDT").unwrap();
    assert_eq!(by_pair.product_id(), &ids[0]);
}

#[tokio::test]
async fn refreshed_depth_reaches_existing_views() {
    let (addr, requests) = start_moving_depth_server().await;
    let ids = [ProductId::from("BTCUSDT"), ProductId::from("ETHBTC")];
    let exchange = binance::connect(&config(addr), &ids).await.unwrap();
    let btc = exchange.get_order_book(&ids[0]).unwrap();
    let before = btc.best_bid().unwrap().price();

    assert_eq!(exchange.refresh_order_books().await.unwrap(), 2);
    assert!(btc.best_bid().unwrap().price() > before);
    assert_eq!(requests.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn binance_exchange_never_has_a_ticker_feed() {
    let addr = start_mock_server().await;
    let exchange = binance::connect(&config(addr), &[ProductId::from("BTCUSDT")])
        .await
        .unwrap();
    assert!(!exchange.has_ticker_feed());
}

#[tokio::test]
async fn unknown_symbol_fails_connect() {
    let addr = start_mock_server().await;
    let err = binance::connect(&config(addr), &[ProductId::from("XYZABC")])
        .await
        .unwrap_err();
    assert!(err.is_lookup(), "{err}");
}
