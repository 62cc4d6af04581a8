//! Claims over the public facade: resolution payouts, cancellation
//! refunds, and whole-lifecycle collateral conservation.

use chrono::{Duration, Utc};
use predmatch_engine::Exchange;
use predmatch_types::{
    AccountId, Amount, ExchangeConfig, MarketId, OrderSide, Outcome, PredmatchError,
};

fn exchange() -> Exchange {
    Exchange::new(ExchangeConfig {
        min_order_notional: 1,
        max_open_orders_per_account: 200,
    })
}

fn funded(ex: &Exchange, amount: Amount) -> AccountId {
    let account = AccountId::new();
    ex.deposit(account, amount).unwrap();
    account
}

fn open_market(ex: &Exchange) -> (AccountId, MarketId) {
    let operator = AccountId::new();
    let market = ex
        .create_market(operator, Utc::now() + Duration::days(30))
        .unwrap();
    (operator, market)
}

/// Mint `qty` YES to `yes_buyer` and `qty` NO to `no_buyer` at the given
/// YES price via a MINT match. Funds both sides exactly.
fn mint_pair(
    ex: &Exchange,
    market: MarketId,
    yes_buyer: AccountId,
    no_buyer: AccountId,
    yes_bps: u32,
    qty: Amount,
) {
    let yes_cost = u64::from(yes_bps) * qty / 10_000;
    ex.deposit(yes_buyer, yes_cost.max(1)).unwrap();
    ex.deposit(no_buyer, qty - yes_cost).unwrap();
    ex.place_order(
        no_buyer,
        market,
        OrderSide::Buy,
        Outcome::No,
        10_000 - yes_bps,
        qty,
        None,
    )
    .unwrap();
    ex.place_order(yes_buyer, market, OrderSide::Buy, Outcome::Yes, yes_bps, qty, None)
        .unwrap();
}

// =============================================================================
// Test: double claim — first succeeds, second fails, no balance change
// =============================================================================
#[test]
fn winnings_claim_is_one_shot() {
    let ex = exchange();
    let (operator, market) = open_market(&ex);
    let winner = AccountId::new();
    let loser = AccountId::new();
    mint_pair(&ex, market, winner, loser, 4_000, 100);

    ex.resolve_market(operator, market, Outcome::Yes).unwrap();

    let payout = ex.claim_winnings(winner, market).unwrap();
    assert_eq!(payout, 100);
    assert_eq!(ex.balance(winner).unwrap().free(), 100);
    assert_eq!(ex.share_balance(market, winner, Outcome::Yes).unwrap(), 0);
    assert_eq!(ex.market_snapshot(market).unwrap().total_collateral, 0);

    let err = ex.claim_winnings(winner, market).unwrap_err();
    assert!(matches!(err, PredmatchError::AlreadyClaimed { .. }));
    assert_eq!(ex.balance(winner).unwrap().free(), 100, "no balance change");

    ex.verify_collateral_conservation().unwrap();
}

// =============================================================================
// Test: the losing side has nothing to claim
// =============================================================================
#[test]
fn losing_shares_pay_nothing() {
    let ex = exchange();
    let (operator, market) = open_market(&ex);
    let winner = AccountId::new();
    let loser = AccountId::new();
    mint_pair(&ex, market, winner, loser, 4_000, 100);

    ex.resolve_market(operator, market, Outcome::Yes).unwrap();

    let err = ex.claim_winnings(loser, market).unwrap_err();
    assert!(matches!(err, PredmatchError::NothingToClaim));
    assert_eq!(ex.balance(loser).unwrap().free(), 0);
    // The losing shares still exist; they are just worthless.
    assert_eq!(ex.share_balance(market, loser, Outcome::No).unwrap(), 100);
}

// =============================================================================
// Test: claims require a resolved market
// =============================================================================
#[test]
fn claims_gated_by_market_state() {
    let ex = exchange();
    let (operator, market) = open_market(&ex);
    let holder = AccountId::new();
    let other = AccountId::new();
    mint_pair(&ex, market, holder, other, 5_000, 50);

    let err = ex.claim_winnings(holder, market).unwrap_err();
    assert!(matches!(err, PredmatchError::MarketNotResolved { .. }));

    let err = ex.claim_refund(holder, market).unwrap_err();
    assert!(matches!(err, PredmatchError::MarketNotCancelled { .. }));

    // Resolving closes the refund path permanently.
    ex.resolve_market(operator, market, Outcome::No).unwrap();
    let err = ex.claim_refund(holder, market).unwrap_err();
    assert!(matches!(err, PredmatchError::MarketNotCancelled { .. }));
}

// =============================================================================
// Test: cancellation refunds matched pairs at one unit each
// =============================================================================
#[test]
fn cancellation_refunds_matched_pairs() {
    let ex = exchange();
    let (operator, market) = open_market(&ex);
    let holder = AccountId::new();
    let other = AccountId::new();

    // holder ends with 100 YES and 40 NO: 40 matched pairs, 60 unpaired.
    mint_pair(&ex, market, holder, other, 4_000, 100);
    mint_pair(&ex, market, other, holder, 6_000, 40);

    ex.cancel_market(operator, market).unwrap();

    let refunded = ex.claim_refund(holder, market).unwrap();
    assert_eq!(refunded, 40);
    assert_eq!(ex.balance(holder).unwrap().free(), 40);
    assert_eq!(ex.share_balance(market, holder, Outcome::Yes).unwrap(), 60);
    assert_eq!(ex.share_balance(market, holder, Outcome::No).unwrap(), 0);

    // A second attempt finds no pairs left.
    let err = ex.claim_refund(holder, market).unwrap_err();
    assert!(matches!(err, PredmatchError::NothingToClaim));

    // The counterparty's pairs are refundable independently.
    let refunded = ex.claim_refund(other, market).unwrap();
    assert_eq!(refunded, 40);

    ex.verify_collateral_conservation().unwrap();
}

// =============================================================================
// Test: full life cycle conserves collateral end to end
// =============================================================================
#[test]
fn full_cycle_conserves_collateral() {
    let ex = exchange();
    let (operator, market) = open_market(&ex);
    let alice = AccountId::new();
    let bob = AccountId::new();

    // Mint 200 pairs: alice long YES at 3000bp, bob long NO at 7000bp.
    mint_pair(&ex, market, alice, bob, 3_000, 200);
    ex.verify_collateral_conservation().unwrap();

    // Alice sells half her YES to carol directly.
    let carol = funded(&ex, 40);
    ex.place_order(carol, market, OrderSide::Buy, Outcome::Yes, 4_000, 100, None)
        .unwrap();
    ex.place_order(alice, market, OrderSide::Sell, Outcome::Yes, 4_000, 100, None)
        .unwrap();
    ex.verify_collateral_conservation().unwrap();

    // YES wins; both YES holders redeem 1:1, bob gets nothing.
    ex.resolve_market(operator, market, Outcome::Yes).unwrap();
    assert_eq!(ex.claim_winnings(alice, market).unwrap(), 100);
    assert_eq!(ex.claim_winnings(carol, market).unwrap(), 100);
    assert!(matches!(
        ex.claim_winnings(bob, market).unwrap_err(),
        PredmatchError::NothingToClaim
    ));

    // Pool fully drained, every share burned.
    let snap = ex.market_snapshot(market).unwrap();
    assert_eq!(snap.total_collateral, 0);
    assert_eq!(snap.yes_supply, 0);
    assert_eq!(snap.no_supply, 200, "losing NO shares remain outstanding");

    // Winners can withdraw their proceeds.
    ex.withdraw(alice, ex.balance(alice).unwrap().free()).unwrap();
    ex.withdraw(carol, ex.balance(carol).unwrap().free()).unwrap();
    ex.verify_collateral_conservation().unwrap();
}
