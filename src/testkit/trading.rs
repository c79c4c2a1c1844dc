//! Stub authenticated clients.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::adapter::outbound::coinbase::{
    CoinbaseAccount, CoinbaseAuthClient, CoinbaseOrder, CoinbaseOrderRequest,
};
use crate::domain::{
    Account, AccountId, MarketAmount, OrderId, OrderReport, OrderSide, OrderType, Product, ProductId,
};
use crate::error::{Error, Result};
use crate::port::{AccountCapability, TradingCapability};

/// Domain-level stub for [`AccountCapability`] and [`TradingCapability`].
///
/// Accounts are mutable so tests can add one after construction. Every call
/// that would reach the network bumps [`calls`](Self::calls).
pub struct StubTrading {
    accounts: Mutex<Vec<Account>>,
    calls: Arc<AtomicU32>,
    next_order: AtomicU32,
}

impl StubTrading {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            calls: Arc::new(AtomicU32::new(0)),
            next_order: AtomicU32::new(1),
        }
    }

    pub fn push_account(&self, account: Account) {
        self.accounts.lock().push(account);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_order_id(&self) -> OrderId {
        OrderId::new(format!(
            "order-{}",
            self.next_order.fetch_add(1, Ordering::SeqCst)
        ))
    }
}

#[async_trait]
impl AccountCapability for StubTrading {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.lock().clone())
    }

    async fn account(&self, account_id: &AccountId) -> Result<Account> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .lock()
            .iter()
            .find(|a| &a.account_id == account_id)
            .cloned()
            .ok_or_else(|| Error::Exchange {
                exchange: "stub",
                message: format!("NotFound: account {account_id}"),
            })
    }
}

#[async_trait]
impl TradingCapability for StubTrading {
    async fn cancel_order(
        &self,
        order_id: &OrderId,
        _product_id: Option<&ProductId>,
    ) -> Result<OrderId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(order_id.clone())
    }

    async fn limit_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        _price: Decimal,
        size: Decimal,
    ) -> Result<OrderReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OrderReport {
            order_id: self.next_order_id(),
            product: Product::with_id(product_id.clone()),
            order_side: side,
            order_type: OrderType::Limit,
            size: Some(size),
        })
    }

    async fn market_order(
        &self,
        product_id: &ProductId,
        side: OrderSide,
        amount: MarketAmount,
    ) -> Result<OrderReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OrderReport {
            order_id: self.next_order_id(),
            product: Product::with_id(product_id.clone()),
            order_side: side,
            order_type: OrderType::Market,
            size: match amount {
                MarketAmount::Size(size) => Some(size),
                MarketAmount::Funds(_) => None,
            },
        })
    }
}

/// Stub of the external signed Coinbase client.
///
/// Orders are echoed back with ids `cb-1`, `cb-2`, ... and recorded.
pub struct StubCoinbaseClient {
    accounts: Vec<CoinbaseAccount>,
    placed: Mutex<Vec<CoinbaseOrderRequest>>,
    cancelled: Mutex<Vec<(String, Option<String>)>>,
    next_order: AtomicU32,
}

impl StubCoinbaseClient {
    pub fn new(accounts: Vec<CoinbaseAccount>) -> Self {
        Self {
            accounts,
            placed: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            next_order: AtomicU32::new(1),
        }
    }

    /// Order requests received, in order.
    pub fn placed(&self) -> Vec<CoinbaseOrderRequest> {
        self.placed.lock().clone()
    }

    /// `(order_id, product_id)` pairs received by `cancel_order`.
    pub fn cancelled(&self) -> Vec<(String, Option<String>)> {
        self.cancelled.lock().clone()
    }
}

#[async_trait]
impl CoinbaseAuthClient for StubCoinbaseClient {
    async fn get_accounts(&self) -> Result<Vec<CoinbaseAccount>> {
        Ok(self.accounts.clone())
    }

    async fn get_account(&self, account_id: &str) -> Result<CoinbaseAccount> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or_else(|| Error::Exchange {
                exchange: "Coinbase",
                message: "NotFound".into(),
            })
    }

    async fn cancel_order(&self, order_id: &str, product_id: Option<&str>) -> Result<String> {
        self.cancelled
            .lock()
            .push((order_id.to_string(), product_id.map(str::to_string)));
        Ok(order_id.to_string())
    }

    async fn place_order(&self, order: &CoinbaseOrderRequest) -> Result<CoinbaseOrder> {
        self.placed.lock().push(order.clone());
        Ok(CoinbaseOrder {
            id: format!("cb-{}", self.next_order.fetch_add(1, Ordering::SeqCst)),
            product_id: order.product_id.clone(),
            side: order.side,
            order_type: order.order_type,
            size: order.size,
            price: order.price,
            funds: order.funds,
            status: Some("pending".into()),
        })
    }
}
