//! Error types for the PredMatch exchange.
//!
//! All errors use the `PM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Collateral ledger errors
//! - 3xx: Share registry errors
//! - 4xx: Market errors
//! - 5xx: Matching errors
//! - 6xx: Claim / settlement errors
//! - 8xx: Authorization errors
//! - 9xx: General / internal errors
//!
//! Every error aborts the whole call with no partial state change. None are
//! retried automatically; callers re-submit with corrected parameters.

use thiserror::Error;

use crate::ids::{MarketId, OrderId};
use crate::market::MarketStatus;
use crate::order::OrderStatus;
use crate::units::Amount;

/// Central error enum for all PredMatch operations.
#[derive(Debug, Error)]
pub enum PredmatchError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The requested order was not found.
    #[error("PM_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Price is outside the open interval (0, 10_000) basis points.
    #[error("PM_ERR_101: Invalid price: {bps} basis points (valid range 1..=9999)")]
    InvalidPrice { bps: u32 },

    /// Quantity must be strictly positive.
    #[error("PM_ERR_102: Invalid quantity: must be > 0")]
    InvalidQuantity,

    /// Expiry is in the past at placement time.
    #[error("PM_ERR_103: Invalid expiry: already in the past")]
    InvalidExpiry,

    /// Order notional is below the configured minimum.
    #[error("PM_ERR_104: Order below minimum: notional {notional}, minimum {minimum}")]
    OrderBelowMinimum { notional: Amount, minimum: Amount },

    /// The order cannot be cancelled in its current state.
    #[error("PM_ERR_105: Order cannot be cancelled in state {status}")]
    OrderNotCancellable { status: OrderStatus },

    /// Only the owning account may cancel an order.
    #[error("PM_ERR_106: Caller does not own order {0}")]
    NotOrderOwner(OrderId),

    /// An order with this ID already exists in the book.
    #[error("PM_ERR_107: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// Too many open orders for this account.
    #[error("PM_ERR_108: Open order limit exceeded for account")]
    OrderLimitExceeded,

    // =================================================================
    // Collateral Ledger Errors (2xx)
    // =================================================================
    /// Not enough free balance to perform the operation.
    #[error("PM_ERR_200: Insufficient free balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Not enough locked balance to unlock, transfer, or spend.
    #[error("PM_ERR_201: Insufficient locked balance")]
    InsufficientLocked,

    /// Zero-amount deposits and withdrawals are rejected.
    #[error("PM_ERR_202: Amount must be > 0")]
    ZeroAmount,

    /// A balance operation would overflow the fixed-point range.
    #[error("PM_ERR_203: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Share Registry Errors (3xx)
    // =================================================================
    /// Not enough outcome shares for the operation.
    #[error("PM_ERR_300: Insufficient shares: need {needed}, hold {held}")]
    InsufficientShares { needed: Amount, held: Amount },

    /// A burn would take a market's share supply below zero.
    #[error("PM_ERR_301: Share supply underflow for {0}")]
    ShareSupplyUnderflow(MarketId),

    // =================================================================
    // Market Errors (4xx)
    // =================================================================
    /// The requested market was not found.
    #[error("PM_ERR_400: Market not found: {0}")]
    MarketNotFound(MarketId),

    /// Trading is only allowed on Active markets.
    #[error("PM_ERR_401: Market is {status}, not Active")]
    MarketNotActive { status: MarketStatus },

    /// The requested lifecycle transition is not allowed.
    #[error("PM_ERR_402: Invalid market transition: {from} -> {to}")]
    InvalidTransition {
        from: MarketStatus,
        to: MarketStatus,
    },

    /// Winnings can only be claimed on a Resolved market.
    #[error("PM_ERR_403: Market is {status}, not Resolved")]
    MarketNotResolved { status: MarketStatus },

    /// Refunds can only be claimed on a Cancelled market.
    #[error("PM_ERR_404: Market is {status}, not Cancelled")]
    MarketNotCancelled { status: MarketStatus },

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// A fill could not be settled consistently.
    #[error("PM_ERR_500: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    // =================================================================
    // Claim Errors (6xx)
    // =================================================================
    /// This account has already claimed winnings for this market.
    #[error("PM_ERR_600: Winnings already claimed for {market}")]
    AlreadyClaimed { market: MarketId },

    /// No winning shares / matched pairs to claim.
    #[error("PM_ERR_601: Nothing to claim")]
    NothingToClaim,

    /// The market pool cannot cover the payout — critical safety alert.
    #[error("PM_ERR_602: Insufficient pool collateral: need {needed}, pooled {pooled}")]
    InsufficientPoolCollateral { needed: Amount, pooled: Amount },

    /// Collateral conservation invariant violated — critical safety alert.
    #[error("PM_ERR_603: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // Authorization Errors (8xx)
    // =================================================================
    /// The caller is not a registered matching-engine instance.
    #[error("PM_ERR_800: Caller is not an authorized engine")]
    UnauthorizedEngine,

    /// The caller is not the market's operator.
    #[error("PM_ERR_801: Caller is not the market operator")]
    UnauthorizedOperator,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PM_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PredmatchError>;
