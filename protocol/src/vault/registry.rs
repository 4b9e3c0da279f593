//! # Reserve Registry
//!
//! The set of reserve assets the vault accepts, each with its own rates,
//! oracle, ledger handle, and flags. Registration ("blessing") is an
//! idempotent upsert: re-blessing an asset overwrites its config in place
//! and never duplicates its enumeration entry.
//!
//! Two orderings are maintained alongside the source-of-truth map:
//!
//! - `order` — append-once insertion order of every asset ever blessed,
//!   used by iterate-all operations such as withdraw-all. Entries are
//!   never removed, even when an asset is disabled.
//! - `whitelist_order` — insertion order of the redemption whitelist.
//!   Membership tracks the `reprove_whitelisted` flag, so entries come
//!   and go as blesses flip it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::error::VaultError;
use crate::ledger::{AssetLedger, ReserveId};
use crate::oracle::ReserveOracle;

// ---------------------------------------------------------------------------
// ReserveConfig
// ---------------------------------------------------------------------------

/// Configuration record for one blessed reserve asset.
#[derive(Clone)]
pub struct ReserveConfig {
    /// Fraction of each mint withheld as a time-vested bonus, in basis
    /// points (0..=10_000).
    pub minting_interest_rate_bps: u32,

    /// Per-reserve tax rate, in basis points. Accrued into the free-reserve
    /// book at mint time; the redemption-side tax uses the vault-wide rate
    /// instead.
    pub burning_tax_rate_bps: u32,

    /// Blocks between a mint and its vesting entry unlocking.
    pub vesting_period_blocks: u64,

    /// Conversion authority for this asset.
    pub oracle: Arc<dyn ReserveOracle>,

    /// Transfer capability for this asset's ledger.
    pub ledger: Arc<dyn AssetLedger>,

    /// When true, both mint and burn are rejected for this asset.
    pub disabled: bool,

    /// When true, redemptions against this asset are permitted. Independent
    /// of `disabled`.
    pub reprove_whitelisted: bool,
}

impl fmt::Debug for ReserveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReserveConfig")
            .field("minting_interest_rate_bps", &self.minting_interest_rate_bps)
            .field("burning_tax_rate_bps", &self.burning_tax_rate_bps)
            .field("vesting_period_blocks", &self.vesting_period_blocks)
            .field("disabled", &self.disabled)
            .field("reprove_whitelisted", &self.reprove_whitelisted)
            .finish_non_exhaustive()
    }
}

/// What an upsert actually changed — consumed by the engine to decide which
/// signals to emit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlessDelta {
    /// True when the asset had never been blessed before.
    pub is_new: bool,
    /// The asset's position in the append-once enumeration order.
    pub index: usize,
    /// `Some(new_membership)` when whitelist membership actually flipped;
    /// `None` for no-op blesses that must not emit a membership signal.
    pub whitelist_change: Option<bool>,
}

// ---------------------------------------------------------------------------
// ReserveRegistry
// ---------------------------------------------------------------------------

/// All blessed reserves, with ordered enumeration and the redemption
/// whitelist kept in lockstep.
#[derive(Default)]
pub struct ReserveRegistry {
    /// Source of truth. Membership here is also the duplicate-suppression
    /// guard for `order`.
    reserves: HashMap<ReserveId, ReserveConfig>,
    /// Append-once insertion order; never shrinks.
    order: Vec<ReserveId>,
    /// Redemption whitelist, insertion-ordered.
    whitelist_order: Vec<ReserveId>,
    /// Redemption whitelist membership.
    whitelisted: HashSet<ReserveId>,
}

impl ReserveRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates a reserve config, maintaining both enumeration
    /// orders. Returns what changed so the caller can emit signals.
    pub(crate) fn upsert(&mut self, id: ReserveId, config: ReserveConfig) -> BlessDelta {
        let previous = self.reserves.get(&id);
        let is_new = previous.is_none();
        let was_whitelisted = previous.map(|c| c.reprove_whitelisted).unwrap_or(false);
        let now_whitelisted = config.reprove_whitelisted;

        if is_new {
            self.order.push(id);
        }
        // is_new guarantees membership in `order`, so position always hits.
        let index = self
            .order
            .iter()
            .position(|entry| *entry == id)
            .unwrap_or(self.order.len());

        self.reserves.insert(id, config);

        let whitelist_change = match (was_whitelisted, now_whitelisted) {
            (false, true) => {
                self.whitelisted.insert(id);
                self.whitelist_order.push(id);
                Some(true)
            }
            (true, false) => {
                self.whitelisted.remove(&id);
                self.whitelist_order.retain(|entry| *entry != id);
                Some(false)
            }
            _ => None,
        };

        BlessDelta {
            is_new,
            index,
            whitelist_change,
        }
    }

    /// Looks up a reserve config.
    pub fn get(&self, id: &ReserveId) -> Option<&ReserveConfig> {
        self.reserves.get(id)
    }

    /// Fails with [`VaultError::UnknownReserve`] if the asset was never
    /// blessed.
    pub fn require_exists(&self, id: &ReserveId) -> Result<&ReserveConfig, VaultError> {
        self.reserves.get(id).ok_or(VaultError::UnknownReserve(*id))
    }

    /// Existence first, then the disabled flag: fails with
    /// [`VaultError::ReserveDisabled`] for registered-but-disabled assets.
    pub fn require_enabled(&self, id: &ReserveId) -> Result<&ReserveConfig, VaultError> {
        let config = self.require_exists(id)?;
        if config.disabled {
            return Err(VaultError::ReserveDisabled(*id));
        }
        Ok(config)
    }

    /// Fails with [`VaultError::NotWhitelistedForRedemption`] unless the
    /// asset is on the reprove whitelist.
    pub fn require_reprove_whitelisted(&self, id: &ReserveId) -> Result<&ReserveConfig, VaultError> {
        let config = self.require_exists(id)?;
        if !config.reprove_whitelisted {
            return Err(VaultError::NotWhitelistedForRedemption(*id));
        }
        Ok(config)
    }

    /// True when the asset has been blessed at least once.
    pub fn is_registered(&self, id: &ReserveId) -> bool {
        self.reserves.contains_key(id)
    }

    /// Number of assets ever blessed.
    pub fn reserve_count(&self) -> usize {
        self.order.len()
    }

    /// The asset at `index` in bless order.
    pub fn reserve_at(&self, index: usize) -> Option<ReserveId> {
        self.order.get(index).copied()
    }

    /// The full bless-order enumeration.
    pub fn order(&self) -> &[ReserveId] {
        &self.order
    }

    /// Number of assets currently whitelisted for redemption.
    pub fn whitelist_count(&self) -> usize {
        self.whitelist_order.len()
    }

    /// The whitelisted asset at `index` in whitelist-insertion order.
    pub fn whitelist_at(&self, index: usize) -> Option<ReserveId> {
        self.whitelist_order.get(index).copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
