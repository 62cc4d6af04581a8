//! Outcome-share bookkeeping: per-account balances and per-market supplies.
//!
//! Shares only come into existence through MINT matches and only leave
//! through BURN matches and claims, so every mutation here is engine-gated.
//! A DIRECT match moves existing shares between accounts without touching
//! the supply.

use std::collections::HashMap;

use predmatch_types::{
    AccountId, Amount, EngineId, MarketId, Outcome, PredmatchError, Result,
};
use tracing::debug;

use crate::auth::CallerRegistry;

/// Outstanding YES/NO supply for one market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeSupply {
    pub yes: Amount,
    pub no: Amount,
}

impl OutcomeSupply {
    fn of(&mut self, outcome: Outcome) -> &mut Amount {
        match outcome {
            Outcome::Yes => &mut self.yes,
            Outcome::No => &mut self.no,
        }
    }

    #[must_use]
    pub fn get(&self, outcome: Outcome) -> Amount {
        match outcome {
            Outcome::Yes => self.yes,
            Outcome::No => self.no,
        }
    }
}

/// Per-(market, account, outcome) share balances plus per-market supplies.
#[derive(Debug, Default)]
pub struct ShareRegistry {
    balances: HashMap<(MarketId, AccountId, Outcome), Amount>,
    supplies: HashMap<MarketId, OutcomeSupply>,
    auth: CallerRegistry,
}

impl ShareRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Approve an engine instance for mint/burn/transfer.
    pub fn authorize_engine(&mut self, engine: EngineId) {
        self.auth.authorize(engine);
    }

    /// Mint `quantity` shares of `outcome` to `account`, growing the
    /// market's supply by the same amount.
    ///
    /// # Errors
    /// `UnauthorizedEngine`, or `BalanceOverflow` on the share balance.
    pub fn mint(
        &mut self,
        engine: EngineId,
        market: MarketId,
        account: AccountId,
        outcome: Outcome,
        quantity: Amount,
    ) -> Result<()> {
        self.auth.check(engine)?;
        let balance = self.balances.entry((market, account, outcome)).or_default();
        *balance = balance
            .checked_add(quantity)
            .ok_or(PredmatchError::BalanceOverflow)?;
        let supply = self.supplies.entry(market).or_default().of(outcome);
        *supply = supply
            .checked_add(quantity)
            .ok_or(PredmatchError::BalanceOverflow)?;
        debug!(%market, %account, %outcome, quantity, "mint");
        Ok(())
    }

    /// Burn `quantity` shares of `outcome` from `account`, shrinking the
    /// market's supply by the same amount.
    ///
    /// # Errors
    /// `UnauthorizedEngine`, `InsufficientShares` if the account holds
    /// fewer than `quantity`, or `ShareSupplyUnderflow` if the supply
    /// counter would go negative (an internal inconsistency).
    pub fn burn(
        &mut self,
        engine: EngineId,
        market: MarketId,
        account: AccountId,
        outcome: Outcome,
        quantity: Amount,
    ) -> Result<()> {
        self.auth.check(engine)?;
        let held = self.balance_of(market, account, outcome);
        if held < quantity {
            return Err(PredmatchError::InsufficientShares {
                needed: quantity,
                held,
            });
        }
        let supply = self.supplies.entry(market).or_default().of(outcome);
        *supply = supply
            .checked_sub(quantity)
            .ok_or(PredmatchError::ShareSupplyUnderflow(market))?;
        if let Some(balance) = self.balances.get_mut(&(market, account, outcome)) {
            *balance -= quantity;
        }
        debug!(%market, %account, %outcome, quantity, "burn");
        Ok(())
    }

    /// Move existing shares between accounts. Net supply is unchanged —
    /// this is the share leg of a DIRECT match.
    ///
    /// # Errors
    /// `UnauthorizedEngine`, or `InsufficientShares` on the source.
    pub fn transfer(
        &mut self,
        engine: EngineId,
        market: MarketId,
        from: AccountId,
        to: AccountId,
        outcome: Outcome,
        quantity: Amount,
    ) -> Result<()> {
        self.auth.check(engine)?;
        let held = self.balance_of(market, from, outcome);
        if held < quantity {
            return Err(PredmatchError::InsufficientShares {
                needed: quantity,
                held,
            });
        }
        if let Some(balance) = self.balances.get_mut(&(market, from, outcome)) {
            *balance -= quantity;
        }
        let dst = self.balances.entry((market, to, outcome)).or_default();
        // Cannot overflow: supply fits in Amount and dst + quantity <= supply.
        *dst += quantity;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Shares of `outcome` held by `account` in `market`.
    #[must_use]
    pub fn balance_of(&self, market: MarketId, account: AccountId, outcome: Outcome) -> Amount {
        self.balances
            .get(&(market, account, outcome))
            .copied()
            .unwrap_or(0)
    }

    /// Outstanding YES/NO supply for a market.
    #[must_use]
    pub fn supply(&self, market: MarketId) -> OutcomeSupply {
        self.supplies.get(&market).copied().unwrap_or_default()
    }
}
