//! # Vault Failure Taxonomy
//!
//! Every way a vault operation can fail, in one enum. All of these are
//! precondition violations — the engine has no corrupt or unrecoverable
//! states, and nothing is retried internally.

use thiserror::Error;

use crate::ledger::{Address, LedgerError, ReserveId};

/// Errors returned by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The caller is not the current crown.
    #[error("only the crown can execute this operation (caller: {caller})")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// The reserve asset was never blessed.
    #[error("reserve does not exist: {0}")]
    UnknownReserve(ReserveId),

    /// The reserve is registered but currently disabled for mint and burn.
    #[error("reserve is disabled: {0}")]
    ReserveDisabled(ReserveId),

    /// Redemption attempted against a reserve that is not on the reprove
    /// whitelist.
    #[error("reserve is not whitelisted for redemption: {0}")]
    NotWhitelistedForRedemption(ReserveId),

    /// A free-reserve withdrawal asked for more than the tracked balance.
    #[error("free reserve exceeded: requested {requested}, tracked {available} ({reserve})")]
    MaxAmountExceeded {
        /// The reserve being withdrawn from.
        reserve: ReserveId,
        /// The requested peg-equivalent amount.
        requested: u64,
        /// The tracked free-reserve balance.
        available: u64,
    },

    /// A rate parameter exceeds the 10_000 bps ceiling.
    #[error("rate out of range: {bps} bps exceeds 10000 bps")]
    RateOutOfRange {
        /// The offending rate.
        bps: u32,
    },

    /// Checked amount arithmetic overflowed. With validated rates this is
    /// only reachable through extreme vesting-period or amount inputs.
    #[error("amount overflow during vault arithmetic")]
    AmountOverflow,

    /// A ledger condition, propagated unchanged from the pegged-token or
    /// reserve-asset ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
