//! # The Crown
//!
//! A single mutable authority address. Whoever holds the crown may bless
//! reserves, withdraw funds, and pass the crown on; nobody else may do any
//! of those things. There is no multi-sig, no timelock, no council — the
//! trust model is deliberately one address deep.

use serde::{Deserialize, Serialize};

use super::error::VaultError;
use crate::ledger::Address;

/// The vault's admin authority.
///
/// Owned by the [`Vault`](super::engine::Vault) and consulted first — before
/// any other state read — in every gated operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crown {
    holder: Address,
}

impl Crown {
    /// Crowns the initial holder.
    pub fn new(holder: Address) -> Self {
        Self { holder }
    }

    /// The current holder.
    pub fn holder(&self) -> &Address {
        &self.holder
    }

    /// Fails with [`VaultError::Unauthorized`] unless `caller` holds the
    /// crown.
    pub fn require(&self, caller: &Address) -> Result<(), VaultError> {
        if *caller != self.holder {
            return Err(VaultError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Replaces the holder, returning the previous one. Callers are
    /// responsible for gating this with [`require`](Self::require) first.
    pub(crate) fn pass_to(&mut self, new_holder: Address) -> Address {
        std::mem::replace(&mut self.holder, new_holder)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
