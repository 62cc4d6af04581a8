//! # predmatch-settlement
//!
//! Terminal-state payouts for resolved and cancelled markets, plus the
//! collateral conservation invariant checker.
//!
//! - [`ClaimLedger`] — winnings claims (one per account per resolved
//!   market, guarded against double claims) and cancellation refunds of
//!   matched YES/NO pairs
//! - [`ConservationTracker`] — lifetime deposits minus withdrawals
//!   checked against live ledger totals and market pools
//!
//! Everything here operates over the same ledger and share registry the
//! matching engine uses, with the same engine-token authorization.

pub mod claims;
pub mod conservation;

pub use claims::ClaimLedger;
pub use conservation::ConservationTracker;
