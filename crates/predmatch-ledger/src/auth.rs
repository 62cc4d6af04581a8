//! Registry of engine instances approved for privileged mutations.
//!
//! The ledger and share registry trust no ambient caller. Every
//! privileged entry point takes an explicit [`EngineId`] token and checks
//! it against this registry first.

use std::collections::HashSet;

use predmatch_types::{EngineId, PredmatchError, Result};

/// Approved-caller set gating `lock`/`unlock`/`transfer_locked` on the
/// collateral ledger and `mint`/`burn`/`transfer` on the share registry.
#[derive(Debug, Default)]
pub struct CallerRegistry {
    approved: HashSet<EngineId>,
}

impl CallerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Approve an engine instance.
    pub fn authorize(&mut self, engine: EngineId) {
        self.approved.insert(engine);
    }

    /// Remove an engine instance. Pending operations already past the
    /// check are unaffected.
    pub fn revoke(&mut self, engine: &EngineId) {
        self.approved.remove(engine);
    }

    /// Gate a privileged operation.
    ///
    /// # Errors
    /// Returns `UnauthorizedEngine` for unknown callers.
    pub fn check(&self, engine: EngineId) -> Result<()> {
        if self.approved.contains(&engine) {
            Ok(())
        } else {
            Err(PredmatchError::UnauthorizedEngine)
        }
    }

    #[must_use]
    pub fn is_authorized(&self, engine: EngineId) -> bool {
        self.approved.contains(&engine)
    }
}
