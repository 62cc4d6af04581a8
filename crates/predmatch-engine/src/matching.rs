//! The three-strategy matching scan and per-fill settlement.
//!
//! Each strategy walks its book segment in arrival order and takes the
//! first price-compatible candidate — no best-price selection. A
//! candidate that cannot settle (shares moved away, degenerate rounding
//! on a lock) is skipped with a warning and the scan continues; fills
//! already committed stay committed.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use predmatch_ledger::{CollateralLedger, ShareRegistry};
use predmatch_types::{
    AccountId, EngineId, MatchType, OrderId, OrderSide, Outcome, Result, Trade,
    constants::PRICE_SCALE,
};
use tracing::{debug, warn};

use crate::exchange::lock;
use crate::state::MarketState;

/// Match a newly placed (taker) order against the book.
///
/// Strategy order is fixed: DIRECT first, then MINT for BUY takers or
/// BURN for SELL takers. Returns the `(owner, id)` of every maker that
/// became fully filled and left the book; the caller maintains the
/// open-order index. A fully filled taker is removed from the book here.
pub(crate) fn run_matching(
    engine: EngineId,
    state: &mut MarketState,
    ledger: &Mutex<CollateralLedger>,
    shares: &Mutex<ShareRegistry>,
    taker_id: OrderId,
    now: DateTime<Utc>,
) -> Result<Vec<(AccountId, OrderId)>> {
    let (taker_side, taker_outcome) = {
        let taker = state.order(taker_id)?;
        (taker.side, taker.outcome)
    };
    let mut removed = Vec::new();

    // a. DIRECT: the opposite side of the same outcome.
    let direct_side = match taker_side {
        OrderSide::Buy => OrderSide::Sell,
        OrderSide::Sell => OrderSide::Buy,
    };
    scan_segment(
        engine,
        state,
        ledger,
        shares,
        taker_id,
        MatchType::Direct,
        taker_outcome,
        direct_side,
        now,
        &mut removed,
    )?;

    // b/c. MINT pairs complementary buyers; BURN pairs complementary
    // sellers. Either way the segment is the taker's own side of the
    // opposite outcome.
    let pair_type = match taker_side {
        OrderSide::Buy => MatchType::Mint,
        OrderSide::Sell => MatchType::Burn,
    };
    scan_segment(
        engine,
        state,
        ledger,
        shares,
        taker_id,
        pair_type,
        taker_outcome.opposite(),
        taker_side,
        now,
        &mut removed,
    )?;

    if state.order(taker_id)?.is_filled() {
        state.book.remove(&taker_id)?;
    }
    Ok(removed)
}

#[allow(clippy::too_many_arguments)]
fn scan_segment(
    engine: EngineId,
    state: &mut MarketState,
    ledger: &Mutex<CollateralLedger>,
    shares: &Mutex<ShareRegistry>,
    taker_id: OrderId,
    match_type: MatchType,
    seg_outcome: Outcome,
    seg_side: OrderSide,
    now: DateTime<Utc>,
    removed: &mut Vec<(AccountId, OrderId)>,
) -> Result<()> {
    // Snapshot: fills remove entries mid-walk.
    let candidates = state.book.snapshot(seg_outcome, seg_side);
    for maker_id in candidates {
        let (taker_remaining, taker_side, taker_price) = {
            let taker = state.order(taker_id)?;
            (taker.remaining(), taker.side, taker.price)
        };
        if taker_remaining == 0 {
            break;
        }

        let maker = state.order(maker_id)?;
        // Expired entries stay resident and unmatchable until their
        // owner cancels them.
        if !maker.is_matchable(now) {
            continue;
        }
        let compatible = match match_type {
            MatchType::Direct => maker.crosses(taker_side, taker_price),
            MatchType::Mint => taker_price.bps_sum(maker.price) >= PRICE_SCALE,
            MatchType::Burn => taker_price.bps_sum(maker.price) <= PRICE_SCALE,
        };
        if !compatible {
            continue;
        }

        let fill = taker_remaining.min(maker.remaining());
        if !try_settle(
            engine, state, ledger, shares, match_type, taker_id, maker_id, fill, now,
        )? {
            continue;
        }

        let maker = state.order(maker_id)?;
        if maker.is_filled() {
            let owner = maker.owner;
            state.book.remove(&maker_id)?;
            removed.push((owner, maker_id));
        }
    }
    Ok(())
}

/// Settle one fill. `Ok(false)` means the candidate was skipped with no
/// state change; `Ok(true)` means the fill committed. All shortfall
/// checks run before the first mutation, so a skip is always clean.
#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
fn try_settle(
    engine: EngineId,
    state: &mut MarketState,
    ledger: &Mutex<CollateralLedger>,
    shares: &Mutex<ShareRegistry>,
    match_type: MatchType,
    taker_id: OrderId,
    maker_id: OrderId,
    fill: u64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let mut ledger = lock(ledger)?;
    let mut shares = lock(shares)?;
    let market_id = state.market.id;
    let taker = state.order(taker_id)?.clone();
    let maker = state.order(maker_id)?.clone();

    let (taker_release, maker_release) = match match_type {
        MatchType::Direct => {
            // Settlement at the maker's price: improvement accrues to
            // the taker.
            let cost = maker.price.cost(fill);
            let (buyer, seller) = match taker.side {
                OrderSide::Buy => (&taker, &maker),
                OrderSide::Sell => (&maker, &taker),
            };
            let held = shares.balance_of(market_id, seller.owner, taker.outcome);
            if held < fill {
                warn!(maker = %maker.id, held, fill, "direct match skipped: seller shares moved");
                return Ok(false);
            }
            let Some(release) = buyer.collateral_for_fill(fill, cost) else {
                warn!(buyer = %buyer.id, fill, cost, "direct match skipped: lock short of cost");
                return Ok(false);
            };
            ledger.transfer_locked(engine, buyer.owner, seller.owner, cost)?;
            ledger.unlock(engine, buyer.owner, release - cost)?;
            shares.transfer(engine, market_id, seller.owner, buyer.owner, taker.outcome, fill)?;
            match taker.side {
                OrderSide::Buy => (release, 0),
                OrderSide::Sell => (0, release),
            }
        }
        MatchType::Mint => {
            let (yes, no) = match taker.outcome {
                Outcome::Yes => (&taker, &maker),
                Outcome::No => (&maker, &taker),
            };
            // The YES buyer pays its own price share; the NO buyer pays
            // the exact remainder, so the pool gains exactly `fill`.
            let yes_cost = yes.price.cost(fill);
            let no_cost = fill - yes_cost;
            let Some(yes_release) = yes.collateral_for_fill(fill, yes_cost) else {
                warn!(order = %yes.id, fill, yes_cost, "mint skipped: YES lock short of cost");
                return Ok(false);
            };
            let Some(no_release) = no.collateral_for_fill(fill, no_cost) else {
                warn!(order = %no.id, fill, no_cost, "mint skipped: NO lock short of remainder");
                return Ok(false);
            };
            let Some(new_pool) = state.market.total_collateral.checked_add(fill) else {
                warn!(fill, "mint skipped: pool overflow");
                return Ok(false);
            };
            ledger.spend_locked(engine, yes.owner, yes_cost)?;
            ledger.unlock(engine, yes.owner, yes_release - yes_cost)?;
            ledger.spend_locked(engine, no.owner, no_cost)?;
            ledger.unlock(engine, no.owner, no_release - no_cost)?;
            shares.mint(engine, market_id, yes.owner, Outcome::Yes, fill)?;
            shares.mint(engine, market_id, no.owner, Outcome::No, fill)?;
            state.market.total_collateral = new_pool;
            match taker.outcome {
                Outcome::Yes => (yes_release, no_release),
                Outcome::No => (no_release, yes_release),
            }
        }
        MatchType::Burn => {
            let (yes, no) = match taker.outcome {
                Outcome::Yes => (&taker, &maker),
                Outcome::No => (&maker, &taker),
            };
            // Mirror of MINT: the YES seller receives its own price
            // share, the NO seller the exact remainder.
            let yes_payout = yes.price.cost(fill);
            let no_payout = fill - yes_payout;
            let yes_held = shares.balance_of(market_id, yes.owner, Outcome::Yes);
            let no_held = shares.balance_of(market_id, no.owner, Outcome::No);
            if yes_held < fill || no_held < fill {
                warn!(yes_held, no_held, fill, "burn skipped: seller shares moved");
                return Ok(false);
            }
            if state.market.total_collateral < fill {
                warn!(
                    pool = state.market.total_collateral,
                    fill, "burn skipped: pool short of return"
                );
                return Ok(false);
            }
            shares.burn(engine, market_id, yes.owner, Outcome::Yes, fill)?;
            shares.burn(engine, market_id, no.owner, Outcome::No, fill)?;
            ledger.credit(engine, yes.owner, yes_payout)?;
            ledger.credit(engine, no.owner, no_payout)?;
            state.market.total_collateral -= fill;
            (0, 0)
        }
    };

    state.order_mut(taker_id)?.apply_fill(fill, taker_release);
    state.order_mut(maker_id)?.apply_fill(fill, maker_release);

    let trade = Trade {
        id: state.next_trade_id(),
        market_id,
        match_type,
        taker_order_id: taker.id,
        taker_account: taker.owner,
        maker_order_id: maker.id,
        maker_account: maker.owner,
        outcome: taker.outcome,
        price: maker.price,
        quantity: fill,
        executed_at: now,
    };
    debug!(%trade, "fill");
    state.trades.push(trade);
    Ok(true)
}
