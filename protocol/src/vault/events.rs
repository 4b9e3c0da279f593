//! # Vault Events
//!
//! Typed signals appended by every state-changing operation. The engine
//! accumulates them in order; the host drains the log with
//! [`Vault::take_events`](super::engine::Vault::take_events) and ships them
//! wherever it likes. Events carry block numbers, never wall-clock time,
//! so a replayed sequence of operations produces an identical log.

use serde::{Deserialize, Serialize};

use crate::ledger::{Address, ReserveId};

/// A signal emitted by the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    /// A reserve was blessed — registered or updated — with this config.
    ReserveRegistered {
        reserve: ReserveId,
        /// Position in the append-once enumeration order.
        index: u64,
        /// Block at which the config takes effect.
        effective_block: u64,
        minting_interest_rate_bps: u32,
        burning_tax_rate_bps: u32,
        vesting_period_blocks: u64,
        disabled: bool,
        reprove_whitelisted: bool,
    },

    /// Redemption-whitelist membership actually changed for a reserve.
    /// No-op blesses never emit this.
    ReproveWhitelistUpdated {
        reserve: ReserveId,
        whitelisted: bool,
    },

    /// A deposit minted pegged tokens. `peg_amount` is the full requested
    /// amount, vested bonus included.
    Praised {
        reserve: ReserveId,
        depositor: Address,
        peg_amount: u64,
    },

    /// A redemption burned pegged tokens. `peg_amount` is the original
    /// requested amount, tax included.
    Reproved {
        reserve: ReserveId,
        account: Address,
        peg_amount: u64,
    },

    /// Unlocked vesting entries were redeemed. Emitted only for nonzero
    /// sums.
    VestingRedeemed { account: Address, amount: u64 },

    /// The crown withdrew against the tax-derived free reserve.
    FreeReserveWithdrawn {
        reserve: ReserveId,
        to: Address,
        /// Peg-equivalent amount debited from the free-reserve counter.
        peg_amount: u64,
        /// Reserve units actually transferred.
        reserve_amount: u64,
    },

    /// The crown withdrew reserve units outright; the asset's free-reserve
    /// counter was reset.
    ReserveWithdrawn {
        reserve: ReserveId,
        to: Address,
        reserve_amount: u64,
    },

    /// The crown changed hands.
    CrownPassed { previous: Address, crown: Address },

    /// The redemption-tax recipient changed.
    TreasuryUpdated { treasury: Address },
}
