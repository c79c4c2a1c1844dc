//! Authenticated capabilities: balances and order management.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Account, AccountId, MarketAmount, OrderId, OrderReport, OrderSide, ProductId};
use crate::error::Result;

/// Read access to the account balances on an exchange.
#[async_trait]
pub trait AccountCapability: Send + Sync {
    /// Every currency account held.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// One account by its exchange id.
    async fn account(&self, account_id: &AccountId) -> Result<Account>;
}

/// Order placement and cancellation.
#[async_trait]
pub trait TradingCapability: Send + Sync {
    /// Cancel an order. Some exchanges need the product to route the request.
    async fn cancel_order(
        &self,
        order_id: &OrderId,
        product_id: Option<&ProductId>,
    ) -> Result<OrderId>;

    /// Post a limit order.
    async fn limit_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        price: Decimal,
        size: Decimal,
    ) -> Result<OrderReport>;

    /// Post a market order sized by base amount or by quote funds.
    async fn market_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        amount: MarketAmount,
    ) -> Result<OrderReport>;
}
