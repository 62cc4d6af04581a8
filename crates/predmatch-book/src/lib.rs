//! # predmatch-book
//!
//! The order book for a single binary-outcome market: one arrival-ordered
//! queue of order ids per `(outcome, side)` segment, plus an id index for
//! removal.
//!
//! **No price/time priority is maintained.** The matching scan walks a
//! segment strictly in arrival order and takes the first price-compatible
//! entry — among several compatible counter-orders, the one matched is the
//! earliest arrived, not the best priced. This sequencing is externally
//! observable in the trade log and is deliberate; do not "fix" it by
//! sorting.

pub mod book;
pub mod queue;

pub use book::OrderBook;
pub use queue::OrderQueue;
