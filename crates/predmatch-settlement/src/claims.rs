//! Winnings claims and cancellation refunds.
//!
//! On a **resolved** market, a holder of winning shares claims once: the
//! full winning balance is burned and pays 1 collateral unit per share
//! from the market pool. A second attempt fails with `AlreadyClaimed`.
//!
//! On a **cancelled** market, a holder of matched YES/NO pairs claims a
//! refund of `min(yes_balance, no_balance)` pairs at 1 unit per pair —
//! the amount each pair's mint contributed to the pool. Per-pair purchase
//! prices are not tracked, so the refund uses the holder's current raw
//! balances, not cost basis. The unpaired remainder is not refundable.
//! Refunds are naturally idempotent: the burn leaves zero pairs behind.

use std::collections::HashSet;

use predmatch_ledger::{CollateralLedger, ShareRegistry};
use predmatch_types::{
    AccountId, Amount, EngineId, Market, MarketId, MarketStatus, Outcome, PredmatchError, Result,
};
use tracing::info;

/// Tracks which accounts have claimed winnings on which markets.
#[derive(Debug, Default)]
pub struct ClaimLedger {
    claimed: HashSet<(MarketId, AccountId)>,
}

impl ClaimLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Redeem an account's full winning-share balance at 1 collateral
    /// unit per share.
    ///
    /// # Errors
    /// `MarketNotResolved`, `AlreadyClaimed`, `NothingToClaim` (a zero
    /// balance does **not** mark the account claimed), or
    /// `InsufficientPoolCollateral` if the pool cannot cover the payout.
    pub fn claim_winnings(
        &mut self,
        engine: EngineId,
        market: &mut Market,
        shares: &mut ShareRegistry,
        ledger: &mut CollateralLedger,
        account: AccountId,
    ) -> Result<Amount> {
        if market.status != MarketStatus::Resolved {
            return Err(PredmatchError::MarketNotResolved {
                status: market.status,
            });
        }
        let winning = market
            .winning_outcome
            .ok_or_else(|| PredmatchError::Internal("resolved market has no outcome".into()))?;

        if self.claimed.contains(&(market.id, account)) {
            return Err(PredmatchError::AlreadyClaimed { market: market.id });
        }

        let payout = shares.balance_of(market.id, account, winning);
        if payout == 0 {
            return Err(PredmatchError::NothingToClaim);
        }
        if market.total_collateral < payout {
            return Err(PredmatchError::InsufficientPoolCollateral {
                needed: payout,
                pooled: market.total_collateral,
            });
        }

        shares.burn(engine, market.id, account, winning, payout)?;
        ledger.credit(engine, account, payout)?;
        market.total_collateral -= payout;
        self.claimed.insert((market.id, account));

        info!(market = %market.id, %account, payout, %winning, "winnings claimed");
        Ok(payout)
    }

    /// Refund an account's matched YES/NO pairs on a cancelled market.
    ///
    /// # Errors
    /// `MarketNotCancelled`, `NothingToClaim` if no matched pairs are
    /// held, or `InsufficientPoolCollateral`.
    pub fn claim_refund(
        &mut self,
        engine: EngineId,
        market: &mut Market,
        shares: &mut ShareRegistry,
        ledger: &mut CollateralLedger,
        account: AccountId,
    ) -> Result<Amount> {
        if market.status != MarketStatus::Cancelled {
            return Err(PredmatchError::MarketNotCancelled {
                status: market.status,
            });
        }

        let yes_held = shares.balance_of(market.id, account, Outcome::Yes);
        let no_held = shares.balance_of(market.id, account, Outcome::No);
        let pairs = yes_held.min(no_held);
        if pairs == 0 {
            return Err(PredmatchError::NothingToClaim);
        }
        if market.total_collateral < pairs {
            return Err(PredmatchError::InsufficientPoolCollateral {
                needed: pairs,
                pooled: market.total_collateral,
            });
        }

        shares.burn(engine, market.id, account, Outcome::Yes, pairs)?;
        shares.burn(engine, market.id, account, Outcome::No, pairs)?;
        ledger.credit(engine, account, pairs)?;
        market.total_collateral -= pairs;

        info!(market = %market.id, %account, pairs, "refund claimed");
        Ok(pairs)
    }

    /// Whether `account` has already claimed winnings on `market`.
    #[must_use]
    pub fn has_claimed(&self, market: MarketId, account: AccountId) -> bool {
        self.claimed.contains(&(market, account))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    struct Fixture {
        engine: EngineId,
        market: Market,
        shares: ShareRegistry,
        ledger: CollateralLedger,
        claims: ClaimLedger,
    }

    /// A market where `holder` holds `yes`/`no` shares backed by a pool of
    /// `max(yes, no)` — the shape a MINT match leaves behind.
    fn fixture(holder: AccountId, yes: Amount, no: Amount) -> Fixture {
        let engine = EngineId::from_bytes([7; 32]);
        let mut market = Market::new(AccountId::new(), Utc::now() + chrono::Duration::days(7));
        let mut shares = ShareRegistry::new();
        shares.authorize_engine(engine);
        let mut ledger = CollateralLedger::new();
        ledger.authorize_engine(engine);

        shares
            .mint(engine, market.id, holder, Outcome::Yes, yes)
            .unwrap();
        shares
            .mint(engine, market.id, holder, Outcome::No, no)
            .unwrap();
        market.total_collateral = yes.max(no);

        Fixture {
            engine,
            market,
            shares,
            ledger,
            claims: ClaimLedger::new(),
        }
    }

    #[test]
    fn claim_winnings_pays_one_per_share() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 100, 0);
        fx.market.resolve(Outcome::Yes).unwrap();

        let payout = fx
            .claims
            .claim_winnings(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap();

        assert_eq!(payout, 100);
        assert_eq!(fx.ledger.balance(holder).free(), 100);
        assert_eq!(fx.shares.balance_of(fx.market.id, holder, Outcome::Yes), 0);
        assert_eq!(fx.market.total_collateral, 0);
        assert!(fx.claims.has_claimed(fx.market.id, holder));
    }

    #[test]
    fn second_claim_fails_with_already_claimed() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 100, 0);
        fx.market.resolve(Outcome::Yes).unwrap();

        fx.claims
            .claim_winnings(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap();
        let err = fx
            .claims
            .claim_winnings(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap_err();

        assert!(matches!(err, PredmatchError::AlreadyClaimed { .. }));
        // No balance change on the failed attempt.
        assert_eq!(fx.ledger.balance(holder).free(), 100);
    }

    #[test]
    fn losing_side_has_nothing_to_claim() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 0, 50);
        fx.market.resolve(Outcome::Yes).unwrap();

        let err = fx
            .claims
            .claim_winnings(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap_err();
        assert!(matches!(err, PredmatchError::NothingToClaim));
        // A zero-balance attempt must not burn the one-shot claim.
        assert!(!fx.claims.has_claimed(fx.market.id, holder));
    }

    #[test]
    fn claim_on_unresolved_market_fails() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 10, 0);

        let err = fx
            .claims
            .claim_winnings(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap_err();
        assert!(matches!(err, PredmatchError::MarketNotResolved { .. }));
    }

    #[test]
    fn refund_pays_matched_pairs_only() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 70, 40);
        fx.market.cancel().unwrap();

        let refunded = fx
            .claims
            .claim_refund(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap();

        assert_eq!(refunded, 40);
        assert_eq!(fx.ledger.balance(holder).free(), 40);
        // The unpaired YES remainder stays.
        assert_eq!(fx.shares.balance_of(fx.market.id, holder, Outcome::Yes), 30);
        assert_eq!(fx.shares.balance_of(fx.market.id, holder, Outcome::No), 0);
        assert_eq!(fx.market.total_collateral, 30);
    }

    #[test]
    fn refund_is_idempotent_via_burn() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 40, 40);
        fx.market.cancel().unwrap();

        fx.claims
            .claim_refund(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap();
        let err = fx
            .claims
            .claim_refund(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap_err();
        assert!(matches!(err, PredmatchError::NothingToClaim));
    }

    #[test]
    fn refund_requires_cancelled_market() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 10, 10);
        fx.market.resolve(Outcome::Yes).unwrap();

        let err = fx
            .claims
            .claim_refund(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap_err();
        assert!(matches!(err, PredmatchError::MarketNotCancelled { .. }));
    }

    #[test]
    fn pool_shortfall_is_detected() {
        let holder = AccountId::new();
        let mut fx = fixture(holder, 100, 0);
        fx.market.total_collateral = 50; // corrupted pool
        fx.market.resolve(Outcome::Yes).unwrap();

        let err = fx
            .claims
            .claim_winnings(fx.engine, &mut fx.market, &mut fx.shares, &mut fx.ledger, holder)
            .unwrap_err();
        assert!(matches!(
            err,
            PredmatchError::InsufficientPoolCollateral { needed: 100, pooled: 50 }
        ));
    }
}
