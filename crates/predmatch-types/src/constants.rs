//! System-wide constants for the PredMatch exchange.

use crate::units::Amount;

/// Price scale: 10_000 basis points = 100%.
pub const PRICE_SCALE: u64 = 10_000;

/// Lowest valid order price in basis points (0 is rejected).
pub const MIN_PRICE_BPS: u32 = 1;

/// Highest valid order price in basis points (10_000 is rejected).
pub const MAX_PRICE_BPS: u32 = 9_999;

/// Default minimum order notional (`price * quantity / 10_000`) in
/// collateral units. Orders below this are rejected regardless of side.
pub const DEFAULT_MIN_ORDER_NOTIONAL: Amount = 10;

/// Maximum open orders per account across all markets (default).
pub const DEFAULT_MAX_OPEN_ORDERS_PER_ACCOUNT: usize = 200;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "PredMatch";
