//! # Vesting Ledger
//!
//! Every mint withholds a slice of the requested amount and parks it here
//! as a time-locked bonus. Entries are immutable once created, queue up
//! per account in mint order, and leave only through bulk redemption of
//! everything already unlocked — locked entries survive in their original
//! relative order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::Address;

/// One time-locked slice of a mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEntry {
    /// Pegged-token units withheld at mint time.
    pub amount: u64,
    /// First block at which this entry is redeemable.
    pub unlock_block: u64,
}

impl VestingEntry {
    /// True once the entry's unlock block has been reached.
    pub fn is_unlocked(&self, current_block: u64) -> bool {
        self.unlock_block <= current_block
    }
}

/// Aggregate view of one account's queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingInfo {
    /// Sum of all currently unlocked amounts.
    pub redeemable: u64,
    /// Total entries in the queue, locked and unlocked.
    pub pending_count: u64,
}

/// Per-account FIFO queues of vesting entries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VestingLedger {
    queues: HashMap<Address, Vec<VestingEntry>>,
}

impl VestingLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the account's queue. Zero-amount entries are
    /// stored too — every mint creates exactly one entry, whatever the
    /// withholding rate.
    pub(crate) fn append(&mut self, account: &Address, entry: VestingEntry) {
        self.queues.entry(account.clone()).or_default().push(entry);
    }

    /// Read-only view of the account's queue, oldest entry first.
    pub fn queue(&self, account: &Address) -> &[VestingEntry] {
        self.queues.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of the account's unlocked amounts at `current_block`.
    ///
    /// Accumulated in `u128`: each entry came out of a `u64` mint and the
    /// total outstanding peg supply is capped at `u64::MAX`, so the clamp
    /// below is unreachable in any state the engine can produce.
    pub fn unlocked_total(&self, account: &Address, current_block: u64) -> u64 {
        let total: u128 = self
            .queue(account)
            .iter()
            .filter(|entry| entry.is_unlocked(current_block))
            .map(|entry| entry.amount as u128)
            .sum();
        total.min(u64::MAX as u128) as u64
    }

    /// Aggregate view of the account's queue at `current_block`.
    pub fn info(&self, account: &Address, current_block: u64) -> VestingInfo {
        VestingInfo {
            redeemable: self.unlocked_total(account, current_block),
            pending_count: self.queue(account).len() as u64,
        }
    }

    /// Drops every unlocked entry from the account's queue, preserving the
    /// relative order of whatever remains locked. Returns the number of
    /// entries removed.
    pub(crate) fn clear_unlocked(&mut self, account: &Address, current_block: u64) -> usize {
        let Some(queue) = self.queues.get_mut(account) else {
            return 0;
        };
        let before = queue.len();
        queue.retain(|entry| !entry.is_unlocked(current_block));
        let removed = before - queue.len();
        if queue.is_empty() {
            self.queues.remove(account);
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
