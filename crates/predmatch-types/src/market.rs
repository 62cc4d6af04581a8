//! Market record and lifecycle state machine.
//!
//! Transitions: `Active <-> Paused`, and `Active | Paused -> Resolved |
//! Cancelled`. Resolved and Cancelled are terminal. The transitions live
//! on the type itself so the state machine is testable without an engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PredmatchError, Result};
use crate::ids::{AccountId, MarketId};
use crate::order::Outcome;
use crate::units::Amount;

/// Lifecycle status of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketStatus {
    Active,
    Paused,
    Resolved,
    Cancelled,
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Paused => write!(f, "PAUSED"),
            Self::Resolved => write!(f, "RESOLVED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A binary-outcome market.
///
/// YES/NO share supplies live in the share registry; `total_collateral`
/// is the pooled collateral backing all outstanding minted pairs — it
/// grows by exactly one unit per minted pair and shrinks by one per
/// burned pair or redeemed share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    /// The operator identity trusted for lifecycle transitions.
    pub operator: AccountId,
    pub status: MarketStatus,
    /// Set exactly once, by `resolve`.
    pub winning_outcome: Option<Outcome>,
    /// Collateral pooled by MINT matches, net of BURN returns and claims.
    pub total_collateral: Amount,
    pub created_at: DateTime<Utc>,
    /// Operator bookkeeping; trading is gated by `status` only.
    pub expires_at: DateTime<Utc>,
}

impl Market {
    #[must_use]
    pub fn new(operator: AccountId, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: MarketId::new(),
            operator,
            status: MarketStatus::Active,
            winning_outcome: None,
            total_collateral: 0,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MarketStatus::Active
    }

    /// Guard for trading operations.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(PredmatchError::MarketNotActive {
                status: self.status,
            })
        }
    }

    /// `Active -> Paused`.
    pub fn pause(&mut self) -> Result<()> {
        self.transition(MarketStatus::Active, MarketStatus::Paused)
    }

    /// `Paused -> Active`.
    pub fn resume(&mut self) -> Result<()> {
        self.transition(MarketStatus::Paused, MarketStatus::Active)
    }

    /// `Active | Paused -> Resolved`, recording the winning outcome.
    pub fn resolve(&mut self, outcome: Outcome) -> Result<()> {
        self.ensure_open_for_admin(MarketStatus::Resolved)?;
        self.status = MarketStatus::Resolved;
        self.winning_outcome = Some(outcome);
        Ok(())
    }

    /// `Active | Paused -> Cancelled`.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_open_for_admin(MarketStatus::Cancelled)?;
        self.status = MarketStatus::Cancelled;
        Ok(())
    }

    fn transition(&mut self, from: MarketStatus, to: MarketStatus) -> Result<()> {
        if self.status != from {
            return Err(PredmatchError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    fn ensure_open_for_admin(&self, to: MarketStatus) -> Result<()> {
        match self.status {
            MarketStatus::Active | MarketStatus::Paused => Ok(()),
            from => Err(PredmatchError::InvalidTransition { from, to }),
        }
    }
}

/// Read-only market view joining the market record with the share
/// registry's supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: MarketId,
    pub operator: AccountId,
    pub status: MarketStatus,
    pub winning_outcome: Option<Outcome>,
    pub yes_supply: Amount,
    pub no_supply: Amount,
    pub total_collateral: Amount,
    pub open_orders: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
