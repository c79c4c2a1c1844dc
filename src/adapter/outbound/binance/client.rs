//! Binance public REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::dto::{BinanceDepth, BinanceError, BinanceExchangeInfo};
use super::settings::BinanceConfig;
use crate::domain::{Product, ProductId};
use crate::error::{Error, LookupError, Result};
use crate::port::ProductFetcher;

/// HTTP client for the unauthenticated Binance spot endpoints.
pub struct BinanceClient {
    http: HttpClient,
    rest_url: String,
    depth_limit: u32,
}

impl BinanceClient {
    #[must_use]
    pub fn new(rest_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            rest_url: rest_url.into(),
            depth_limit: BinanceConfig::default().depth_limit,
        }
    }

    #[must_use]
    pub fn from_config(config: &BinanceConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            rest_url: config.rest_url.clone(),
            depth_limit: config.depth_limit,
        }
    }

    async fn get<T>(&self, path: &str, subject: Option<&ProductId>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.rest_url.trim_end_matches('/'), path);
        debug!(url = %url, "GET");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        if let Some(product_id) = subject {
            if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
                return Err(LookupError::UnknownProduct {
                    product_id: product_id.to_string(),
                }
                .into());
            }
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<BinanceError>(&body) {
            Ok(e) => format!("{} ({})", e.msg, e.code),
            Err(_) => body,
        };
        Err(Error::Exchange {
            exchange: "Binance",
            message: format!("{status}: {message}"),
        })
    }

    /// Order book snapshot, `depth_limit` levels per side.
    pub async fn get_depth(&self, product_id: &ProductId) -> Result<BinanceDepth> {
        self.get(
            &format!(
                "/api/v3/depth?symbol={product_id}&limit={}",
                self.depth_limit
            ),
            Some(product_id),
        )
        .await
    }
}

#[async_trait]
impl ProductFetcher for BinanceClient {
    /// Binance symbols are the upper-cased currencies concatenated.
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId {
        ProductId::new(format!(
            "{}{}",
            base_currency.to_ascii_uppercase(),
            quote_currency.to_ascii_uppercase()
        ))
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product> {
        let info: BinanceExchangeInfo = self
            .get(
                &format!("/api/v3/exchangeInfo?symbol={product_id}"),
                Some(product_id),
            )
            .await?;
        info.symbols
            .into_iter()
            .find(|s| s.symbol == product_id.as_str())
            .map(Product::from)
            .ok_or_else(|| {
                LookupError::UnknownProduct {
                    product_id: product_id.to_string(),
                }
                .into()
            })
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        let info: BinanceExchangeInfo = self.get("/api/v3/exchangeInfo", None).await?;
        info!(count = info.symbols.len(), "Fetched Binance symbols");
        Ok(info.symbols.into_iter().map(Product::from).collect())
    }

    fn exchange_name(&self) -> &'static str {
        "Binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_upper_case_concatenations() {
        let client = BinanceClient::new("http://localhost");
        assert_eq!(client.make_product_id("eth", "btc").as_str(), "ETHBTC");
        assert_eq!(client.make_product_id("BTC", "USDT").as_str(), "BTCUSDT");
    }
}
