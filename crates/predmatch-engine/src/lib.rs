//! # predmatch-engine
//!
//! The PredMatch exchange core: a fully-collateralized binary-outcome
//! CLOB. [`Exchange`] is the single entry point — it composes the
//! collateral ledger, the share registry, the per-market order books, and
//! the claim ledger behind one synchronous facade.
//!
//! ## Execution model
//!
//! Operations on the same market are totally ordered by a per-market
//! mutex held for the whole lock-scan-settle-update sequence; operations
//! on different markets proceed in parallel. Matching runs synchronously
//! to completion — nothing suspends mid-match, and there is no timeout or
//! cancellation of an in-flight match.
//!
//! ## Matching
//!
//! A new (taker) order is matched in a fixed strategy order:
//!
//! 1. **DIRECT** — opposite side, same outcome; existing shares move from
//!    seller to buyer at the maker's price.
//! 2. **MINT** (BUY takers) — buyers of complementary outcomes whose
//!    prices sum to at least 100%; a fresh YES+NO pair is minted against
//!    pooled collateral.
//! 3. **BURN** (SELL takers) — sellers of complementary outcomes whose
//!    prices sum to at most 100%; a pair is destroyed and pooled
//!    collateral returned.
//!
//! Each strategy scans its book segment in arrival order and takes the
//! first price-compatible candidate.

mod matching;
mod state;

pub mod exchange;

pub use exchange::Exchange;
