//! Order types for the PredMatch matching engine.
//!
//! An order is always a limit order on one outcome of one market. BUY
//! orders lock `price * quantity / 10_000` collateral at placement; SELL
//! orders lock nothing (the shares themselves are the collateral).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, MarketId, OrderId};
use crate::units::{Amount, Price};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// One of the two complementary outcomes of a binary market.
///
/// There is no "invalid" variant: an outcome that reaches the engine is
/// valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// The complementary outcome.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// Lifecycle status of an order.
///
/// `Open` and `PartiallyFilled` are the only matchable states. `Expired`
/// is assigned when an order is cancelled after its expiry instant —
/// expiry is otherwise checked lazily at match time, never swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Expired,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A resting or incoming limit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub market_id: MarketId,
    pub owner: AccountId,
    pub side: OrderSide,
    pub outcome: Outcome,
    pub price: Price,
    pub quantity: Amount,
    pub filled: Amount,
    /// Collateral still reserved for the unfilled remainder. Zero for
    /// SELL orders.
    pub collateral_locked: Amount,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// `None` means the order never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Unfilled quantity.
    #[must_use]
    pub fn remaining(&self) -> Amount {
        self.quantity - self.filled
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled == self.quantity
    }

    /// Whether the order can participate in matching at `now`:
    /// Open/PartiallyFilled and not past its expiry.
    #[must_use]
    pub fn is_matchable(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, OrderStatus::Open | OrderStatus::PartiallyFilled)
            && self.expires_at.is_none_or(|t| now <= t)
    }

    /// Whether this resting order's price is compatible with an incoming
    /// (taker) order on the opposite side of the same outcome: a BUY taker
    /// needs `taker >= maker`, a SELL taker needs `taker <= maker`.
    #[must_use]
    pub fn crosses(&self, taker_side: OrderSide, taker_price: Price) -> bool {
        match taker_side {
            OrderSide::Buy => taker_price >= self.price,
            OrderSide::Sell => taker_price <= self.price,
        }
    }

    /// Collateral to release for a fill of `fill_qty` that costs `charge`:
    /// the pro-rata share of the remaining lock, raised to `charge` when
    /// truncation would release less than the fill costs, capped at what
    /// is still locked. The final fill always releases the whole
    /// remainder, so the lock drains to exactly zero.
    ///
    /// Returns `None` if even the capped release cannot cover `charge`
    /// (degenerate rounding); the caller skips the candidate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn collateral_for_fill(&self, fill_qty: Amount, charge: Amount) -> Option<Amount> {
        debug_assert!(fill_qty <= self.remaining());
        let release = if fill_qty == self.remaining() {
            self.collateral_locked
        } else {
            let pro_rata = (u128::from(self.collateral_locked) * u128::from(fill_qty)
                / u128::from(self.remaining())) as Amount;
            pro_rata.max(charge).min(self.collateral_locked)
        };
        (release >= charge).then_some(release)
    }

    /// Record a fill: bump `filled`, release `released` from the lock,
    /// and advance the status.
    pub fn apply_fill(&mut self, fill_qty: Amount, released: Amount) {
        debug_assert!(fill_qty <= self.remaining());
        debug_assert!(released <= self.collateral_locked);
        self.filled += fill_qty;
        self.collateral_locked -= released;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_buy(market_id: MarketId, outcome: Outcome, price_bps: u32, qty: Amount) -> Self {
        let price = Price::new(price_bps).expect("test price");
        Self {
            id: OrderId::new(),
            market_id,
            owner: AccountId::new(),
            side: OrderSide::Buy,
            outcome,
            price,
            quantity: qty,
            filled: 0,
            collateral_locked: price.cost(qty),
            status: OrderStatus::Open,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn dummy_sell(market_id: MarketId, outcome: Outcome, price_bps: u32, qty: Amount) -> Self {
        Self {
            id: OrderId::new(),
            market_id,
            owner: AccountId::new(),
            side: OrderSide::Sell,
            outcome,
            price: Price::new(price_bps).expect("test price"),
            quantity: qty,
            filled: 0,
            collateral_locked: 0,
            status: OrderStatus::Open,
            created_at: Utc::now(),
            expires_at: None,
        }
    }
}
