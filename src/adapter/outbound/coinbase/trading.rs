//! Coinbase account and order capabilities over an external signed client.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::dto::{CoinbaseAccount, CoinbaseOrder, CoinbaseOrderRequest, CoinbaseSide};
use crate::domain::{
    Account, AccountId, MarketAmount, OrderId, OrderReport, OrderSide, OrderType, Product,
    ProductId,
};
use crate::error::Result;
use crate::port::{AccountCapability, ProductCatalog, TradingCapability};

/// The authenticated Coinbase client this crate wraps.
///
/// Request signing, rate limiting and retries are the implementor's concern.
#[async_trait]
pub trait CoinbaseAuthClient: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<CoinbaseAccount>>;

    async fn get_account(&self, account_id: &str) -> Result<CoinbaseAccount>;

    /// Returns the id of the cancelled order.
    async fn cancel_order(&self, order_id: &str, product_id: Option<&str>) -> Result<String>;

    async fn place_order(&self, order: &CoinbaseOrderRequest) -> Result<CoinbaseOrder>;
}

/// Translates a [`CoinbaseAuthClient`] into the domain capabilities.
pub struct CoinbaseTrading {
    client: Arc<dyn CoinbaseAuthClient>,
    catalog: Arc<dyn ProductCatalog>,
}

impl CoinbaseTrading {
    pub fn new(client: Arc<dyn CoinbaseAuthClient>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { client, catalog }
    }

    /// Build the report, resolving the product through the catalog when it
    /// is known and falling back to an id-only product otherwise.
    async fn report(&self, order: CoinbaseOrder) -> OrderReport {
        let product_id = ProductId::new(order.product_id);
        let product = match self.catalog.get_product(&product_id).await {
            Ok(product) => product,
            Err(e) => {
                debug!(product_id = %product_id, error = %e, "Order product not resolved");
                Product::with_id(product_id)
            }
        };
        OrderReport {
            order_id: OrderId::new(order.id),
            product,
            order_side: order.side.into(),
            order_type: order.order_type,
            size: order.size,
        }
    }
}

#[async_trait]
impl AccountCapability for CoinbaseTrading {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self
            .client
            .get_accounts()
            .await?
            .into_iter()
            .map(Account::from)
            .collect())
    }

    async fn account(&self, account_id: &AccountId) -> Result<Account> {
        Ok(self.client.get_account(account_id.as_str()).await?.into())
    }
}

#[async_trait]
impl TradingCapability for CoinbaseTrading {
    async fn cancel_order(
        &self,
        order_id: &OrderId,
        product_id: Option<&ProductId>,
    ) -> Result<OrderId> {
        let cancelled = self
            .client
            .cancel_order(order_id.as_str(), product_id.map(ProductId::as_str))
            .await?;
        Ok(OrderId::new(cancelled))
    }

    async fn limit_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        price: Decimal,
        size: Decimal,
    ) -> Result<OrderReport> {
        let request = CoinbaseOrderRequest {
            product_id: product_id.to_string(),
            side: CoinbaseSide::from(side),
            order_type: OrderType::Limit,
            price: Some(price),
            size: Some(size),
            funds: None,
        };
        let order = self.client.place_order(&request).await?;
        Ok(self.report(order).await)
    }

    async fn market_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        amount: MarketAmount,
    ) -> Result<OrderReport> {
        let (size, funds) = match amount {
            MarketAmount::Size(size) => (Some(size), None),
            MarketAmount::Funds(funds) => (None, Some(funds)),
        };
        let request = CoinbaseOrderRequest {
            product_id: product_id.to_string(),
            side: CoinbaseSide::from(side),
            order_type: OrderType::Market,
            price: None,
            size,
            funds,
        };
        let order = self.client.place_order(&request).await?;
        Ok(self.report(order).await)
    }
}
