//! # Free-Reserve Accounting
//!
//! Per-reserve counters of custody value attributable to collected tax —
//! the slice the crown may withdraw without touching user-owned backing.
//! Accruals happen at mint time (converted to reserve units as they land);
//! bounded withdrawals decrement the counter, and a full reserve withdrawal
//! resets it to zero, since afterwards no portion remains tracked either way.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::VaultError;
use crate::ledger::ReserveId;

/// Tax-derived balances, one counter per reserve asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FreeReserveBook {
    #[serde(with = "crate::ledger::reserve_id_map")]
    balances: HashMap<ReserveId, u64>,
}

impl FreeReserveBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracked balance for a reserve. Unknown reserves read as zero.
    pub fn available(&self, id: &ReserveId) -> u64 {
        self.balances.get(id).copied().unwrap_or(0)
    }

    /// True when adding `amount` to the counter would overflow. The engine
    /// pre-flights with this before committing external transfers.
    pub(crate) fn would_overflow(&self, id: &ReserveId, amount: u64) -> bool {
        self.available(id).checked_add(amount).is_none()
    }

    /// Adds `amount` to the counter, returning the new balance.
    pub(crate) fn accrue(&mut self, id: &ReserveId, amount: u64) -> Result<u64, VaultError> {
        let balance = self.balances.entry(*id).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(VaultError::AmountOverflow)?;
        Ok(*balance)
    }

    /// Subtracts `amount` from the counter, failing with
    /// [`VaultError::MaxAmountExceeded`] when the request exceeds the
    /// tracked balance. Returns the remaining balance.
    pub(crate) fn debit(&mut self, id: &ReserveId, amount: u64) -> Result<u64, VaultError> {
        let available = self.available(id);
        if amount > available {
            return Err(VaultError::MaxAmountExceeded {
                reserve: *id,
                requested: amount,
                available,
            });
        }
        let remaining = available - amount;
        self.balances.insert(*id, remaining);
        Ok(remaining)
    }

    /// Zeroes the counter, returning the forfeited balance. Called when the
    /// crown withdraws a reserve's full custody balance.
    pub(crate) fn reset(&mut self, id: &ReserveId) -> u64 {
        self.balances.remove(id).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
