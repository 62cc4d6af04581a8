//! The exchange facade: the single public entry point for deposits,
//! market lifecycle, order flow, claims, and read-only queries.
//!
//! Locking: the market map is behind an `RwLock` so lookups don't
//! contend; each market's state is behind its own `Mutex` held for the
//! whole placement/cancellation/claim; the ledger and share registry are
//! behind their own mutexes taken per operation. Operations on distinct
//! markets run in parallel.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use predmatch_ledger::{CollateralLedger, ShareRegistry};
use predmatch_settlement::{ClaimLedger, ConservationTracker};
use predmatch_types::{
    AccountId, Amount, BalanceEntry, EngineId, ExchangeConfig, Market, MarketId, MarketSnapshot,
    Order, OrderId, OrderSide, OrderStatus, Outcome, PredmatchError, Price, Result, Trade,
};
use tracing::info;

use crate::matching;
use crate::state::MarketState;

/// Acquire a mutex, mapping poisoning to an internal error.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| PredmatchError::Internal("mutex poisoned".into()))
}

fn read<T>(rw: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    rw.read()
        .map_err(|_| PredmatchError::Internal("rwlock poisoned".into()))
}

fn write<T>(rw: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    rw.write()
        .map_err(|_| PredmatchError::Internal("rwlock poisoned".into()))
}

/// A fully-collateralized binary-outcome exchange.
///
/// All methods take `&self`; interior locking provides per-market total
/// ordering. Caller identity (`AccountId`) is threaded through every
/// mutating call and is assumed to have been authenticated by the
/// transport layer.
pub struct Exchange {
    engine_id: EngineId,
    config: ExchangeConfig,
    ledger: Mutex<CollateralLedger>,
    shares: Mutex<ShareRegistry>,
    claims: Mutex<ClaimLedger>,
    conservation: Mutex<ConservationTracker>,
    markets: RwLock<HashMap<MarketId, Arc<Mutex<MarketState>>>>,
    /// `OrderId -> MarketId`, so cancel and snapshot don't need a market.
    order_index: RwLock<HashMap<OrderId, MarketId>>,
    /// Open (resting) order ids per account.
    open_orders: RwLock<HashMap<AccountId, HashSet<OrderId>>>,
}

impl Exchange {
    /// Create an exchange with a fresh engine token, registered with its
    /// own ledger and share registry.
    #[must_use]
    pub fn new(config: ExchangeConfig) -> Self {
        let engine_id = EngineId::from_bytes(rand::random());
        let mut ledger = CollateralLedger::new();
        ledger.authorize_engine(engine_id);
        let mut shares = ShareRegistry::new();
        shares.authorize_engine(engine_id);
        info!(engine = %engine_id, "exchange started");
        Self {
            engine_id,
            config,
            ledger: Mutex::new(ledger),
            shares: Mutex::new(shares),
            claims: Mutex::new(ClaimLedger::new()),
            conservation: Mutex::new(ConservationTracker::new()),
            markets: RwLock::new(HashMap::new()),
            order_index: RwLock::new(HashMap::new()),
            open_orders: RwLock::new(HashMap::new()),
        }
    }

    /// The engine token this exchange registered for privileged ledger
    /// mutations.
    #[must_use]
    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    // =================================================================
    // Collateral
    // =================================================================

    /// Deposit collateral for an account (created implicitly).
    pub fn deposit(&self, account: AccountId, amount: Amount) -> Result<()> {
        lock(&self.ledger)?.deposit(account, amount)?;
        lock(&self.conservation)?.record_deposit(amount);
        Ok(())
    }

    /// Withdraw free collateral.
    pub fn withdraw(&self, account: AccountId, amount: Amount) -> Result<()> {
        lock(&self.ledger)?.withdraw(account, amount)?;
        lock(&self.conservation)?.record_withdrawal(amount);
        Ok(())
    }

    /// An account's collateral balance.
    pub fn balance(&self, account: AccountId) -> Result<BalanceEntry> {
        Ok(lock(&self.ledger)?.balance(account))
    }

    // =================================================================
    // Market lifecycle (operator-gated)
    // =================================================================

    /// Create a new Active market operated by `operator`.
    pub fn create_market(
        &self,
        operator: AccountId,
        expires_at: DateTime<Utc>,
    ) -> Result<MarketId> {
        let market = Market::new(operator, expires_at);
        let id = market.id;
        write(&self.markets)?.insert(id, Arc::new(Mutex::new(MarketState::new(market))));
        info!(market = %id, %operator, "market created");
        Ok(id)
    }

    /// `Active -> Paused`.
    pub fn pause_market(&self, caller: AccountId, market_id: MarketId) -> Result<()> {
        self.with_operator_market(caller, market_id, |market| {
            market.pause()?;
            info!(market = %market.id, "market paused");
            Ok(())
        })
    }

    /// `Paused -> Active`.
    pub fn resume_market(&self, caller: AccountId, market_id: MarketId) -> Result<()> {
        self.with_operator_market(caller, market_id, |market| {
            market.resume()?;
            info!(market = %market.id, "market resumed");
            Ok(())
        })
    }

    /// Resolve to the winning outcome. Terminal.
    pub fn resolve_market(
        &self,
        caller: AccountId,
        market_id: MarketId,
        outcome: Outcome,
    ) -> Result<()> {
        self.with_operator_market(caller, market_id, |market| {
            market.resolve(outcome)?;
            info!(market = %market.id, %outcome, "market resolved");
            Ok(())
        })
    }

    /// Cancel the market; holders of matched pairs become refundable.
    /// Terminal.
    pub fn cancel_market(&self, caller: AccountId, market_id: MarketId) -> Result<()> {
        self.with_operator_market(caller, market_id, |market| {
            market.cancel()?;
            info!(market = %market.id, "market cancelled");
            Ok(())
        })
    }

    // =================================================================
    // Order flow
    // =================================================================

    /// Place a limit order and match it synchronously. Returns the new
    /// order's id whether it fully, partially, or did not match.
    #[allow(clippy::too_many_arguments)]
    pub fn place_order(
        &self,
        caller: AccountId,
        market_id: MarketId,
        side: OrderSide,
        outcome: Outcome,
        price_bps: u32,
        quantity: Amount,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<OrderId> {
        let state_arc = self.market_state(market_id)?;
        let mut state = lock(&state_arc)?;
        state.market.ensure_active()?;

        let price = Price::new(price_bps)?;
        if quantity == 0 {
            return Err(PredmatchError::InvalidQuantity);
        }
        let now = Utc::now();
        if expires_at.is_some_and(|t| t <= now) {
            return Err(PredmatchError::InvalidExpiry);
        }
        let open_count = read(&self.open_orders)?
            .get(&caller)
            .map_or(0, HashSet::len);
        if open_count >= self.config.max_open_orders_per_account {
            return Err(PredmatchError::OrderLimitExceeded);
        }

        // SELL orders are collateralized by the shares themselves.
        if side == OrderSide::Sell {
            let held = lock(&self.shares)?.balance_of(market_id, caller, outcome);
            if held < quantity {
                return Err(PredmatchError::InsufficientShares {
                    needed: quantity,
                    held,
                });
            }
        }

        let notional = price.cost(quantity);
        if notional < self.config.min_order_notional {
            return Err(PredmatchError::OrderBelowMinimum {
                notional,
                minimum: self.config.min_order_notional,
            });
        }

        // BUY orders lock the notional up front.
        let collateral_locked = match side {
            OrderSide::Sell => 0,
            OrderSide::Buy => {
                lock(&self.ledger)?.lock(self.engine_id, caller, notional)?;
                notional
            }
        };

        let order = Order {
            id: OrderId::new(),
            market_id,
            owner: caller,
            side,
            outcome,
            price,
            quantity,
            filled: 0,
            collateral_locked,
            status: OrderStatus::Open,
            created_at: now,
            expires_at,
        };
        let order_id = order.id;
        state.book.insert(order_id, outcome, side)?;
        state.orders.insert(order_id, order);
        write(&self.order_index)?.insert(order_id, market_id);

        let removed = matching::run_matching(
            self.engine_id,
            &mut state,
            &self.ledger,
            &self.shares,
            order_id,
            now,
        )?;

        {
            let mut open = write(&self.open_orders)?;
            for (owner, id) in removed {
                if let Some(set) = open.get_mut(&owner) {
                    set.remove(&id);
                }
            }
            let taker = state.order(order_id)?;
            if matches!(
                taker.status,
                OrderStatus::Open | OrderStatus::PartiallyFilled
            ) {
                open.entry(caller).or_default().insert(order_id);
            }
        }

        let taker = state.order(order_id)?;
        info!(
            order = %order_id,
            market = %market_id,
            %side,
            %outcome,
            %price,
            quantity,
            filled = taker.filled,
            status = %taker.status,
            "order placed"
        );
        Ok(order_id)
    }

    /// Cancel an open or partially filled order, unlocking the remaining
    /// collateral. Past-expiry orders are stamped `Expired` instead of
    /// `Cancelled`; collateral reclamation is identical.
    pub fn cancel_order(&self, caller: AccountId, order_id: OrderId) -> Result<()> {
        let market_id = *read(&self.order_index)?
            .get(&order_id)
            .ok_or(PredmatchError::OrderNotFound(order_id))?;
        let state_arc = self.market_state(market_id)?;
        let mut state = lock(&state_arc)?;
        let now = Utc::now();

        let order = state.order(order_id)?;
        if order.owner != caller {
            return Err(PredmatchError::NotOrderOwner(order_id));
        }
        if !matches!(
            order.status,
            OrderStatus::Open | OrderStatus::PartiallyFilled
        ) {
            return Err(PredmatchError::OrderNotCancellable {
                status: order.status,
            });
        }

        let refund = order.collateral_locked;
        if refund > 0 {
            lock(&self.ledger)?.unlock(self.engine_id, caller, refund)?;
        }
        let expired = order.expires_at.is_some_and(|t| now > t);

        let order = state.order_mut(order_id)?;
        order.collateral_locked = 0;
        order.status = if expired {
            OrderStatus::Expired
        } else {
            OrderStatus::Cancelled
        };
        state.book.remove(&order_id)?;
        if let Some(set) = write(&self.open_orders)?.get_mut(&caller) {
            set.remove(&order_id);
        }
        info!(order = %order_id, refund, expired, "order cancelled");
        Ok(())
    }

    // =================================================================
    // Claims
    // =================================================================

    /// Redeem winning shares on a resolved market. One claim per account.
    pub fn claim_winnings(&self, caller: AccountId, market_id: MarketId) -> Result<Amount> {
        let state_arc = self.market_state(market_id)?;
        let mut state = lock(&state_arc)?;
        // Same acquisition order as settlement: ledger before shares.
        let mut ledger = lock(&self.ledger)?;
        let mut shares = lock(&self.shares)?;
        lock(&self.claims)?.claim_winnings(
            self.engine_id,
            &mut state.market,
            &mut shares,
            &mut ledger,
            caller,
        )
    }

    /// Refund matched YES/NO pairs on a cancelled market.
    pub fn claim_refund(&self, caller: AccountId, market_id: MarketId) -> Result<Amount> {
        let state_arc = self.market_state(market_id)?;
        let mut state = lock(&state_arc)?;
        let mut ledger = lock(&self.ledger)?;
        let mut shares = lock(&self.shares)?;
        lock(&self.claims)?.claim_refund(
            self.engine_id,
            &mut state.market,
            &mut shares,
            &mut ledger,
            caller,
        )
    }

    // =================================================================
    // Read-only queries
    // =================================================================

    /// Market record joined with the registry's supplies.
    pub fn market_snapshot(&self, market_id: MarketId) -> Result<MarketSnapshot> {
        let state_arc = self.market_state(market_id)?;
        let state = lock(&state_arc)?;
        let supply = lock(&self.shares)?.supply(market_id);
        let market = &state.market;
        Ok(MarketSnapshot {
            id: market.id,
            operator: market.operator,
            status: market.status,
            winning_outcome: market.winning_outcome,
            yes_supply: supply.yes,
            no_supply: supply.no,
            total_collateral: market.total_collateral,
            open_orders: state.book.order_count(),
            created_at: market.created_at,
            expires_at: market.expires_at,
        })
    }

    /// A point-in-time copy of an order, in any state.
    pub fn order_snapshot(&self, order_id: OrderId) -> Result<Order> {
        let market_id = *read(&self.order_index)?
            .get(&order_id)
            .ok_or(PredmatchError::OrderNotFound(order_id))?;
        let state_arc = self.market_state(market_id)?;
        let state = lock(&state_arc)?;
        state.order(order_id).cloned()
    }

    /// Resting order ids for one book segment, in arrival order.
    pub fn book_order_ids(
        &self,
        market_id: MarketId,
        outcome: Outcome,
        side: OrderSide,
    ) -> Result<Vec<OrderId>> {
        let state_arc = self.market_state(market_id)?;
        let state = lock(&state_arc)?;
        Ok(state.book.snapshot(outcome, side))
    }

    /// An account's open (resting) order ids across all markets.
    pub fn open_order_ids(&self, account: AccountId) -> Result<Vec<OrderId>> {
        let mut ids: Vec<OrderId> = read(&self.open_orders)?
            .get(&account)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        Ok(ids)
    }

    /// The append-only trade log for a market.
    pub fn trades(&self, market_id: MarketId) -> Result<Vec<Trade>> {
        let state_arc = self.market_state(market_id)?;
        let state = lock(&state_arc)?;
        Ok(state.trades.clone())
    }

    /// Shares of `outcome` held by `account` in `market`.
    pub fn share_balance(
        &self,
        market_id: MarketId,
        account: AccountId,
        outcome: Outcome,
    ) -> Result<Amount> {
        Ok(lock(&self.shares)?.balance_of(market_id, account, outcome))
    }

    /// Collateral a hypothetical order would lock: the notional for a
    /// BUY, zero for a SELL.
    pub fn required_collateral(
        &self,
        side: OrderSide,
        price_bps: u32,
        quantity: Amount,
    ) -> Result<Amount> {
        let price = Price::new(price_bps)?;
        if quantity == 0 {
            return Err(PredmatchError::InvalidQuantity);
        }
        Ok(match side {
            OrderSide::Buy => price.cost(quantity),
            OrderSide::Sell => 0,
        })
    }

    /// How much free balance `account` is missing for a hypothetical
    /// order (zero when it can afford it).
    pub fn collateral_shortfall(
        &self,
        account: AccountId,
        side: OrderSide,
        price_bps: u32,
        quantity: Amount,
    ) -> Result<Amount> {
        let required = self.required_collateral(side, price_bps, quantity)?;
        let free = lock(&self.ledger)?.balance(account).free();
        Ok(required.saturating_sub(free))
    }

    /// Check the collateral conservation invariant:
    /// `Σ account totals + Σ market pools == deposits - withdrawals`.
    ///
    /// Call on a quiesced exchange — concurrent settlement between the
    /// ledger read and the pool sweep can report a spurious violation.
    pub fn verify_collateral_conservation(&self) -> Result<()> {
        let ledger_total = lock(&self.ledger)?.total_supply();
        let mut pooled: u128 = 0;
        for state_arc in read(&self.markets)?.values() {
            pooled += u128::from(lock(state_arc)?.market.total_collateral);
        }
        lock(&self.conservation)?.verify(ledger_total + pooled)
    }

    // =================================================================
    // Internals
    // =================================================================

    fn market_state(&self, market_id: MarketId) -> Result<Arc<Mutex<MarketState>>> {
        read(&self.markets)?
            .get(&market_id)
            .cloned()
            .ok_or(PredmatchError::MarketNotFound(market_id))
    }

    fn with_operator_market<F>(&self, caller: AccountId, market_id: MarketId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Market) -> Result<()>,
    {
        let state_arc = self.market_state(market_id)?;
        let mut state = lock(&state_arc)?;
        if state.market.operator != caller {
            return Err(PredmatchError::UnauthorizedOperator);
        }
        f(&mut state.market)
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(ExchangeConfig::default())
    }
}
