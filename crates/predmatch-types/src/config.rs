//! Configuration for a PredMatch exchange instance.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::units::Amount;

/// Tunables for one exchange instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Minimum order notional (`price * quantity / 10_000`) in collateral
    /// units. Applied to both sides; a SELL's lock is zero but its
    /// notional is not.
    pub min_order_notional: Amount,
    /// Maximum open orders per account across all markets.
    pub max_open_orders_per_account: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            min_order_notional: constants::DEFAULT_MIN_ORDER_NOTIONAL,
            max_open_orders_per_account: constants::DEFAULT_MAX_OPEN_ORDERS_PER_ACCOUNT,
        }
    }
}
