//! Currency balances held on an exchange.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::AccountId;

/// One currency balance ("account") on an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Exchange-specific account id, used for direct lookups.
    pub account_id: AccountId,
    /// Currency held in this account.
    pub currency: String,
    /// Current balance.
    pub balance: Decimal,
    /// Portion of the balance reserved by open orders.
    pub hold: Decimal,
    /// Balance available for new orders.
    pub available: Decimal,
}

impl Account {
    /// Whether `available == balance - hold`, as expected of a consistent snapshot.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.available == self.balance - self.hold
    }
}
