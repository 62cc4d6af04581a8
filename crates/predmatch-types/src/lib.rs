//! # predmatch-types
//!
//! Shared types, errors, and configuration for the **PredMatch** exchange.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`AccountId`], [`MarketId`], [`TradeId`], [`EngineId`]
//! - **Units**: [`Amount`] (fixed-point collateral), [`Price`] (basis points)
//! - **Order model**: [`Order`], [`OrderSide`], [`Outcome`], [`OrderStatus`]
//! - **Trade model**: [`Trade`], [`MatchType`]
//! - **Market model**: [`Market`], [`MarketStatus`], [`MarketSnapshot`]
//! - **Balance model**: [`BalanceEntry`]
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`PredmatchError`] with `PM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod market;
pub mod order;
pub mod trade;
pub mod units;

// Re-export all primary types at crate root for ergonomic imports:
//   use predmatch_types::{Order, OrderSide, Outcome, Trade, Market, ...};

pub use balance::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use market::*;
pub use order::*;
pub use trade::*;
pub use units::*;

// Constants are accessed via `predmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
