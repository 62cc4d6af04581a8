//! Per-account collateral accounting with free/locked balances.
//!
//! All mutations are atomic per call: either the full operation succeeds
//! or the balances involved are unchanged. `locked <= total` holds for
//! every account after every operation; arithmetic is checked and
//! overflow is a typed error, never a wrap.

use std::collections::HashMap;

use predmatch_types::{Amount, AccountId, BalanceEntry, EngineId, PredmatchError, Result};
use tracing::debug;

use crate::auth::CallerRegistry;

/// The source of truth for all collateral state.
///
/// Accounts are created implicitly on first deposit and never destroyed,
/// only zeroed. `lock`, `unlock`, `transfer_locked`, `spend_locked`, and
/// `credit` require a registered [`EngineId`].
#[derive(Debug, Default)]
pub struct CollateralLedger {
    accounts: HashMap<AccountId, BalanceEntry>,
    auth: CallerRegistry,
}

impl CollateralLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Approve an engine instance for privileged mutations.
    pub fn authorize_engine(&mut self, engine: EngineId) {
        self.auth.authorize(engine);
    }

    /// Revoke an engine instance.
    pub fn revoke_engine(&mut self, engine: &EngineId) {
        self.auth.revoke(engine);
    }

    // =================================================================
    // Open operations (account-holder initiated)
    // =================================================================

    /// Deposit collateral into an account, creating it if needed.
    ///
    /// # Errors
    /// `ZeroAmount` for zero deposits, `BalanceOverflow` past the
    /// fixed-point range.
    pub fn deposit(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Err(PredmatchError::ZeroAmount);
        }
        let entry = self.accounts.entry(account).or_default();
        entry.total = entry
            .total
            .checked_add(amount)
            .ok_or(PredmatchError::BalanceOverflow)?;
        debug!(%account, amount, total = entry.total, "deposit");
        Ok(())
    }

    /// Withdraw free collateral.
    ///
    /// # Errors
    /// `InsufficientBalance` if `amount` exceeds the free balance.
    pub fn withdraw(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Err(PredmatchError::ZeroAmount);
        }
        let entry = self.entry_mut(account, amount)?;
        if entry.free() < amount {
            return Err(PredmatchError::InsufficientBalance {
                needed: amount,
                available: entry.free(),
            });
        }
        entry.total -= amount;
        debug!(%account, amount, total = entry.total, "withdraw");
        Ok(())
    }

    // =================================================================
    // Engine-gated operations
    // =================================================================

    /// Reserve free collateral against an open order (free -> locked).
    ///
    /// # Errors
    /// `UnauthorizedEngine`, or `InsufficientBalance` if the free balance
    /// cannot cover `amount`.
    pub fn lock(&mut self, engine: EngineId, account: AccountId, amount: Amount) -> Result<()> {
        self.auth.check(engine)?;
        let entry = self.entry_mut(account, amount)?;
        if entry.free() < amount {
            return Err(PredmatchError::InsufficientBalance {
                needed: amount,
                available: entry.free(),
            });
        }
        entry.locked += amount;
        Ok(())
    }

    /// Release locked collateral back to the free balance.
    ///
    /// # Errors
    /// `UnauthorizedEngine`, or `InsufficientLocked`.
    pub fn unlock(&mut self, engine: EngineId, account: AccountId, amount: Amount) -> Result<()> {
        self.auth.check(engine)?;
        if amount == 0 {
            return Ok(());
        }
        let entry = self
            .accounts
            .get_mut(&account)
            .ok_or(PredmatchError::InsufficientLocked)?;
        if entry.locked < amount {
            return Err(PredmatchError::InsufficientLocked);
        }
        entry.locked -= amount;
        Ok(())
    }

    /// Atomically move locked collateral from one account into another's
    /// free balance. The settlement leg of a DIRECT match.
    ///
    /// # Errors
    /// `UnauthorizedEngine`, `InsufficientLocked` on the source, or
    /// `BalanceOverflow` on the destination (source unchanged).
    pub fn transfer_locked(
        &mut self,
        engine: EngineId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.auth.check(engine)?;
        if amount == 0 {
            return Ok(());
        }
        // Validate the destination before touching the source so a failure
        // leaves both entries unchanged.
        let dst_total = self.accounts.get(&to).map_or(0, |entry| entry.total);
        dst_total
            .checked_add(amount)
            .ok_or(PredmatchError::BalanceOverflow)?;

        let src = self
            .accounts
            .get_mut(&from)
            .ok_or(PredmatchError::InsufficientLocked)?;
        if src.locked < amount {
            return Err(PredmatchError::InsufficientLocked);
        }
        src.locked -= amount;
        src.total -= amount;

        let dst = self.accounts.entry(to).or_default();
        dst.total += amount;
        debug!(%from, %to, amount, "transfer_locked");
        Ok(())
    }

    /// Consume locked collateral out of the ledger entirely — the funds
    /// move into a market's pooled collateral, which is tracked on the
    /// market record. The buyer-side settlement leg of a MINT match.
    ///
    /// # Errors
    /// `UnauthorizedEngine`, or `InsufficientLocked`.
    pub fn spend_locked(
        &mut self,
        engine: EngineId,
        account: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.auth.check(engine)?;
        if amount == 0 {
            return Ok(());
        }
        let entry = self
            .accounts
            .get_mut(&account)
            .ok_or(PredmatchError::InsufficientLocked)?;
        if entry.locked < amount {
            return Err(PredmatchError::InsufficientLocked);
        }
        entry.locked -= amount;
        entry.total -= amount;
        Ok(())
    }

    /// Credit free collateral returning from a market pool (BURN returns
    /// and claim payouts).
    ///
    /// # Errors
    /// `UnauthorizedEngine`, or `BalanceOverflow`.
    pub fn credit(&mut self, engine: EngineId, account: AccountId, amount: Amount) -> Result<()> {
        self.auth.check(engine)?;
        let entry = self.accounts.entry(account).or_default();
        entry.total = entry
            .total
            .checked_add(amount)
            .ok_or(PredmatchError::BalanceOverflow)?;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// The balance for an account (zero if never seen).
    #[must_use]
    pub fn balance(&self, account: AccountId) -> BalanceEntry {
        self.accounts.get(&account).copied().unwrap_or_default()
    }

    /// Sum of all accounts' total balances. `u128` so the sum cannot
    /// overflow even with every account at `Amount::MAX`.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.accounts
            .values()
            .map(|entry| u128::from(entry.total))
            .sum()
    }

    fn entry_mut(&mut self, account: AccountId, needed: Amount) -> Result<&mut BalanceEntry> {
        self.accounts
            .get_mut(&account)
            .ok_or(PredmatchError::InsufficientBalance {
                needed,
                available: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CollateralLedger, EngineId) {
        let mut ledger = CollateralLedger::new();
        let engine = EngineId::from_bytes([7; 32]);
        ledger.authorize_engine(engine);
        (ledger, engine)
    }

    #[test]
    fn deposit_increases_total() {
        let (mut ledger, _) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 1_000).unwrap();
        let bal = ledger.balance(account);
        assert_eq!(bal.total, 1_000);
        assert_eq!(bal.locked, 0);
        assert_eq!(bal.free(), 1_000);
    }

    #[test]
    fn zero_deposit_rejected() {
        let (mut ledger, _) = setup();
        let err = ledger.deposit(AccountId::new(), 0).unwrap_err();
        assert!(matches!(err, PredmatchError::ZeroAmount));
    }

    #[test]
    fn withdraw_respects_locked() {
        let (mut ledger, engine) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 1_000).unwrap();
        ledger.lock(engine, account, 400).unwrap();

        let err = ledger.withdraw(account, 700).unwrap_err();
        assert!(matches!(err, PredmatchError::InsufficientBalance { .. }));

        ledger.withdraw(account, 600).unwrap();
        let bal = ledger.balance(account);
        assert_eq!(bal.total, 400);
        assert_eq!(bal.locked, 400);
        assert_eq!(bal.free(), 0);
    }

    #[test]
    fn lock_requires_authorization() {
        let (mut ledger, _) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 1_000).unwrap();

        let rogue = EngineId::from_bytes([9; 32]);
        let err = ledger.lock(rogue, account, 100).unwrap_err();
        assert!(matches!(err, PredmatchError::UnauthorizedEngine));
        // Balance unchanged.
        assert_eq!(ledger.balance(account).locked, 0);
    }

    #[test]
    fn lock_insufficient_free_fails() {
        let (mut ledger, engine) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 100).unwrap();
        let err = ledger.lock(engine, account, 200).unwrap_err();
        assert!(matches!(err, PredmatchError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance(account).total, 100);
    }

    #[test]
    fn unlock_restores_free() {
        let (mut ledger, engine) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 1_000).unwrap();
        ledger.lock(engine, account, 400).unwrap();
        ledger.unlock(engine, account, 400).unwrap();
        let bal = ledger.balance(account);
        assert_eq!(bal.free(), 1_000);
        assert_eq!(bal.locked, 0);
    }

    #[test]
    fn unlock_more_than_locked_fails() {
        let (mut ledger, engine) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 1_000).unwrap();
        ledger.lock(engine, account, 100).unwrap();
        let err = ledger.unlock(engine, account, 101).unwrap_err();
        assert!(matches!(err, PredmatchError::InsufficientLocked));
    }

    #[test]
    fn transfer_locked_moves_between_accounts() {
        let (mut ledger, engine) = setup();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        ledger.deposit(buyer, 500).unwrap();
        ledger.lock(engine, buyer, 225).unwrap();

        ledger.transfer_locked(engine, buyer, seller, 225).unwrap();

        let b = ledger.balance(buyer);
        assert_eq!(b.total, 275);
        assert_eq!(b.locked, 0);
        let s = ledger.balance(seller);
        assert_eq!(s.total, 225);
        assert_eq!(s.free(), 225);
    }

    #[test]
    fn transfer_locked_insufficient_fails() {
        let (mut ledger, engine) = setup();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        ledger.deposit(buyer, 500).unwrap();
        ledger.lock(engine, buyer, 100).unwrap();

        let err = ledger
            .transfer_locked(engine, buyer, seller, 101)
            .unwrap_err();
        assert!(matches!(err, PredmatchError::InsufficientLocked));
        assert_eq!(ledger.balance(seller).total, 0);
        assert_eq!(ledger.balance(buyer).locked, 100);
    }

    #[test]
    fn spend_locked_removes_from_ledger() {
        let (mut ledger, engine) = setup();
        let account = AccountId::new();
        ledger.deposit(account, 1_000).unwrap();
        ledger.lock(engine, account, 600).unwrap();
        ledger.spend_locked(engine, account, 600).unwrap();

        let bal = ledger.balance(account);
        assert_eq!(bal.total, 400);
        assert_eq!(bal.locked, 0);
        assert_eq!(ledger.total_supply(), 400);
    }

    #[test]
    fn credit_adds_free_balance() {
        let (mut ledger, engine) = setup();
        let account = AccountId::new();
        ledger.credit(engine, account, 250).unwrap();
        assert_eq!(ledger.balance(account).free(), 250);
    }

    #[test]
    fn credit_requires_authorization() {
        let (mut ledger, _) = setup();
        let err = ledger
            .credit(EngineId::from_bytes([0; 32]), AccountId::new(), 1)
            .unwrap_err();
        assert!(matches!(err, PredmatchError::UnauthorizedEngine));
    }

    #[test]
    fn deposit_overflow_detected() {
        let (mut ledger, _) = setup();
        let account = AccountId::new();
        ledger.deposit(account, Amount::MAX).unwrap();
        let err = ledger.deposit(account, 1).unwrap_err();
        assert!(matches!(err, PredmatchError::BalanceOverflow));
        assert_eq!(ledger.balance(account).total, Amount::MAX);
    }

    #[test]
    fn total_supply_sums_all_accounts() {
        let (mut ledger, engine) = setup();
        let a = AccountId::new();
        let b = AccountId::new();
        ledger.deposit(a, 1_000).unwrap();
        ledger.deposit(b, 500).unwrap();
        ledger.lock(engine, a, 300).unwrap();
        assert_eq!(ledger.total_supply(), 1_500);
    }

    #[test]
    fn nonexistent_balance_is_zero() {
        let ledger = CollateralLedger::new();
        assert!(ledger.balance(AccountId::new()).is_zero());
    }
}
