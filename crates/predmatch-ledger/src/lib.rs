//! # predmatch-ledger
//!
//! **Funds plane**: collateral accounting and outcome-share bookkeeping.
//!
//! Two pieces of state live here, both behind the same authorization
//! boundary:
//!
//! - [`CollateralLedger`] — per-account `total`/`locked` balances with
//!   atomic lock, unlock, and transfer operations
//! - [`ShareRegistry`] — per-(market, account, outcome) share balances and
//!   per-market YES/NO supplies
//!
//! Privileged mutations (locking, transferring locked funds, minting and
//! burning shares) are gated by a [`CallerRegistry`] of approved
//! [`EngineId`]s — unauthorized callers are rejected with
//! `PM_ERR_800`, never silently ignored. Deposits and withdrawals are open
//! to any account; the transport layer authenticates the account identity
//! before it reaches this crate.
//!
//! [`EngineId`]: predmatch_types::EngineId

pub mod auth;
pub mod ledger;
pub mod shares;

pub use auth::CallerRegistry;
pub use ledger::CollateralLedger;
pub use shares::{OutcomeSupply, ShareRegistry};
