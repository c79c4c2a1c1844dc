//! Coinbase public REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::dto::{CoinbaseBook, CoinbaseProduct};
use super::settings::CoinbaseConfig;
use crate::domain::{Product, ProductId};
use crate::error::{Error, LookupError, Result};
use crate::port::ProductFetcher;

const USER_AGENT: &str = concat!("zcoins/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the unauthenticated Coinbase endpoints.
pub struct CoinbaseClient {
    http: HttpClient,
    rest_url: String,
}

impl CoinbaseClient {
    #[must_use]
    pub fn new(rest_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            rest_url: rest_url.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CoinbaseConfig) -> Self {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            rest_url: config.rest_url.clone(),
        }
    }

    /// GET `path` and decode the JSON body.
    ///
    /// With `subject` set, 404 and 400 become [`LookupError::UnknownProduct`].
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
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        Err(Error::Exchange {
            exchange: "Coinbase",
            message: format!("{status}: {message}"),
        })
    }

    /// Level-2 (aggregated) snapshot of one product's book.
    pub async fn get_product_book(&self, product_id: &ProductId) -> Result<CoinbaseBook> {
        self.get(
            &format!("/products/{product_id}/book?level=2"),
            Some(product_id),
        )
        .await
    }
}

#[async_trait]
impl ProductFetcher for CoinbaseClient {
    fn make_product_id(&self, base_currency: &str, quote_currency: &str) -> ProductId {
        ProductId::new(format!("{base_currency}-{quote_currency}"))
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product> {
        let product: CoinbaseProduct = self
            .get(&format!("/products/{product_id}"), Some(product_id))
            .await?;
        Ok(product.into())
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        let products: Vec<CoinbaseProduct> = self.get("/products", None).await?;
        info!(count = products.len(), "Fetched Coinbase products");
        Ok(products.into_iter().map(Product::from).collect())
    }

    fn exchange_name(&self) -> &'static str {
        "Coinbase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_join_with_dash() {
        let client = CoinbaseClient::new("http://localhost");
        assert_eq!(client.make_product_id("BTC", "USD").as_str(), "BTC-USD");
    }

    #[test]
    fn from_config_keeps_rest_url() {
        let config = CoinbaseConfig {
            rest_url: "https://api-public.sandbox.exchange.coinbase.com".into(),
            ..CoinbaseConfig::default()
        };
        let client = CoinbaseClient::from_config(&config);
        assert_eq!(client.rest_url, config.rest_url);
        assert_eq!(client.exchange_name(), "Coinbase");
    }
}
