//! Per-market mutable state guarded by the market's mutex.

use std::collections::HashMap;

use predmatch_book::OrderBook;
use predmatch_types::{Market, Order, OrderId, PredmatchError, Result, Trade, TradeId};

/// Everything that must stay consistent under one market's lock: the
/// market record, the book, the order store, and the trade log.
///
/// Terminal orders stay in `orders` for snapshot queries; only the book
/// and the open-order index forget them.
#[derive(Debug)]
pub(crate) struct MarketState {
    pub market: Market,
    pub book: OrderBook,
    pub orders: HashMap<OrderId, Order>,
    /// Append-only fill log.
    pub trades: Vec<Trade>,
    fill_seq: u64,
}

impl MarketState {
    pub fn new(market: Market) -> Self {
        let book = OrderBook::new(market.id);
        Self {
            market,
            book,
            orders: HashMap::new(),
            trades: Vec::new(),
            fill_seq: 0,
        }
    }

    /// Next deterministic trade id for this market.
    pub fn next_trade_id(&mut self) -> TradeId {
        let id = TradeId::deterministic(self.market.id, self.fill_seq);
        self.fill_seq += 1;
        id
    }

    pub fn order(&self, id: OrderId) -> Result<&Order> {
        self.orders.get(&id).ok_or(PredmatchError::OrderNotFound(id))
    }

    pub fn order_mut(&mut self, id: OrderId) -> Result<&mut Order> {
        self.orders
            .get_mut(&id)
            .ok_or(PredmatchError::OrderNotFound(id))
    }
}
