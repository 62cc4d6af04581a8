//! Balance tracking for the collateral ledger.
//!
//! Every account has a `total` balance and a `locked` portion reserved
//! against open BUY orders. The free (withdrawable) balance is
//! `total - locked`; `locked <= total` holds at all times.

use serde::{Deserialize, Serialize};

use crate::units::Amount;

/// A single account's collateral balance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Total collateral held by the account.
    pub total: Amount,
    /// Portion of `total` reserved against open BUY orders.
    pub locked: Amount,
}

impl BalanceEntry {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Free (withdrawable) balance: `total - locked`.
    #[must_use]
    pub fn free(&self) -> Amount {
        self.total - self.locked
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total == 0
    }
}
