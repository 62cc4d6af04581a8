//! Monetary units: fixed-point collateral amounts and basis-point prices.
//!
//! All money in PredMatch is integer arithmetic. [`Amount`] is an opaque
//! fixed-point collateral unit; [`Price`] is an integer in basis points
//! where 10_000 = 100%. Products go through `u128` so `price * quantity`
//! cannot overflow, and division truncates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PRICE_BPS, MIN_PRICE_BPS, PRICE_SCALE};
use crate::error::{PredmatchError, Result};

/// Fixed-point collateral amount. One outcome share redeems for exactly
/// one unit of collateral at resolution.
pub type Amount = u64;

/// A limit price in basis points, validated to the open interval
/// `(0, 10_000)`. A YES price of 4_500bp means 45% of one collateral unit
/// per share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Price(u32);

impl Price {
    /// Validate and construct a price.
    ///
    /// # Errors
    /// Returns `InvalidPrice` for 0, 10_000, or anything above.
    pub fn new(bps: u32) -> Result<Self> {
        if !(MIN_PRICE_BPS..=MAX_PRICE_BPS).contains(&bps) {
            return Err(PredmatchError::InvalidPrice { bps });
        }
        Ok(Self(bps))
    }

    /// The raw basis-point value.
    #[must_use]
    pub fn bps(self) -> u32 {
        self.0
    }

    /// Collateral cost of `quantity` shares at this price:
    /// `quantity * bps / 10_000`, truncating.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cost(self, quantity: Amount) -> Amount {
        (u128::from(quantity) * u128::from(self.0) / u128::from(PRICE_SCALE)) as Amount
    }

    /// The complementary price: `10_000 - bps`. Complement of a valid
    /// price is always valid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn complement(self) -> Self {
        Self(PRICE_SCALE as u32 - self.0)
    }

    /// Sum of two prices in basis points. Used by the MINT/BURN
    /// compatibility tests (`>= 10_000` / `<= 10_000`).
    #[must_use]
    pub fn bps_sum(self, other: Self) -> u64 {
        u64::from(self.0) + u64::from(other.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
