//! Trade types produced by the matching engine.
//!
//! A [`Trade`] is the immutable record of one fill between a taker and a
//! maker. Trades are write-once and appended to a per-market trade log;
//! nothing ever mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, MarketId, OrderId, TradeId};
use crate::order::Outcome;
use crate::units::{Amount, Price};

/// How a fill was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Buyer and seller of the same outcome; existing shares change hands.
    Direct,
    /// Two buyers of complementary outcomes; a new YES+NO pair is minted
    /// against fresh pooled collateral.
    Mint,
    /// Two sellers of complementary outcomes; a YES+NO pair is destroyed
    /// and pooled collateral returned.
    Burn,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "DIRECT"),
            Self::Mint => write!(f, "MINT"),
            Self::Burn => write!(f, "BURN"),
        }
    }
}

/// A single fill between a taker and a maker order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Deterministic from (market id, fill sequence).
    pub id: TradeId,
    pub market_id: MarketId,
    pub match_type: MatchType,
    /// The newly placed order that triggered matching.
    pub taker_order_id: OrderId,
    pub taker_account: AccountId,
    /// The order already resident in the book.
    pub maker_order_id: OrderId,
    pub maker_account: AccountId,
    /// The taker's outcome (for MINT/BURN the maker is on the opposite one).
    pub outcome: Outcome,
    /// Settlement price — always the maker's limit price.
    pub price: Price,
    /// Executed quantity in shares.
    pub quantity: Amount,
    pub executed_at: DateTime<Utc>,
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} {} {} x {} @ {}",
            self.id, self.market_id, self.match_type, self.outcome, self.quantity, self.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade() -> Trade {
        let market = MarketId::new();
        Trade {
            id: TradeId::deterministic(market, 0),
            market_id: market,
            match_type: MatchType::Mint,
            taker_order_id: OrderId::new(),
            taker_account: AccountId::new(),
            maker_order_id: OrderId::new(),
            maker_account: AccountId::new(),
            outcome: Outcome::Yes,
            price: Price::new(6_000).unwrap(),
            quantity: 100,
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn match_type_display() {
        assert_eq!(format!("{}", MatchType::Direct), "DIRECT");
        assert_eq!(format!("{}", MatchType::Mint), "MINT");
        assert_eq!(format!("{}", MatchType::Burn), "BURN");
    }

    #[test]
    fn trade_display() {
        let t = make_trade();
        let s = format!("{t}");
        assert!(s.contains("MINT"));
        assert!(s.contains("6000bp"));
    }

    #[test]
    fn trade_serde_roundtrip() {
        let trade = make_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.id, back.id);
        assert_eq!(trade.match_type, back.match_type);
        assert_eq!(trade.quantity, back.quantity);
    }
}
