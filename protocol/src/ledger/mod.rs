//! # Ledger Module — Accounts, Asset Identity & Fungible-Ledger Capabilities
//!
//! The vault engine never owns token bookkeeping. The pegged token and every
//! reserve asset live in external ledgers the engine does not control; this
//! module defines the capability traits the engine calls through, plus the
//! identity types those calls are keyed by.
//!
//! ```text
//! mod.rs     — Address, ReserveId, LedgerError, PegLedger, AssetLedger
//! memory.rs  — MemoryLedger: in-memory reference implementation of both
//! ```
//!
//! ## Design Principles
//!
//! 1. **Capabilities, not addresses.** A registered reserve carries an
//!    `Arc<dyn AssetLedger>` handle; the engine invokes transfers through
//!    it and never dispatches on raw identifiers.
//! 2. **The engine trusts, the ledger enforces.** Balance, allowance, and
//!    authority checks belong to the ledger implementation; the engine only
//!    pre-reads them to keep its own operations all-or-nothing.
//! 3. **`&self` mutation.** Trait methods take `&self` so hosts can share
//!    one ledger across many holders; implementations synchronize
//!    internally (see [`MemoryLedger`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryLedger;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An account identifier inside a ledger.
///
/// Formatted by convention as `aurum:<label-or-hex>`. The engine treats
/// addresses as opaque — equality is the only operation it relies on — so
/// hosts are free to use public keys, bech32 strings, or test labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Creates an address from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// ReserveId
// ---------------------------------------------------------------------------

/// A unique, content-addressed identifier for a reserve asset.
///
/// Computed as `BLAKE3(name || symbol || issuer)` with separator bytes.
/// Two reserves with identical properties always produce the same ID,
/// making this a natural deduplication key across hosts — no registry
/// coordination required.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReserveId([u8; 32]);

impl ReserveId {
    /// Creates a `ReserveId` from a raw 32-byte hash.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hex-encoded identifier.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded identifier.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives a `ReserveId` from the asset's canonical properties.
    ///
    /// The hash input is `name`, `symbol`, and `issuer` (UTF-8 bytes),
    /// joined with `0x00` separators so that one field's suffix can never
    /// be confused with another field's prefix.
    pub fn derive(name: &str, symbol: &str, issuer: &str) -> Self {
        let mut preimage = Vec::with_capacity(name.len() + symbol.len() + issuer.len() + 2);
        preimage.extend_from_slice(name.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(symbol.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(issuer.as_bytes());

        Self(*blake3::hash(&preimage).as_bytes())
    }
}

impl fmt::Debug for ReserveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReserveId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for ReserveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for ReserveId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// Serde helper: serialize HashMap<ReserveId, V> with hex-string keys
// ---------------------------------------------------------------------------

/// Serde helper module for serializing/deserializing `HashMap<ReserveId, V>`
/// as a JSON object with hex-encoded string keys.
///
/// JSON requires map keys to be strings, but `ReserveId` wraps `[u8; 32]`
/// which serde would serialize as an array. This module converts keys
/// to/from their hex representation so the map serializes correctly.
///
/// # Usage
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct MyStruct {
///     #[serde(with = "crate::ledger::reserve_id_map")]
///     balances: HashMap<ReserveId, u64>,
/// }
/// ```
pub mod reserve_id_map {
    use super::ReserveId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(map: &HashMap<ReserveId, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut ser_map = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            ser_map.serialize_entry(&key.to_hex(), value)?;
        }
        ser_map.end()
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<ReserveId, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let string_map: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(key, value)| {
                ReserveId::from_hex(&key)
                    .map(|id| (id, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by ledger implementations.
///
/// The vault engine propagates these unchanged — a failed pull or burn
/// reaches the caller as the ledger's own named condition, not a vault
/// condition.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The account does not hold enough units for the requested debit.
    #[error("insufficient balance: {account} holds {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// Units currently held.
        available: u64,
        /// Units requested.
        requested: u64,
    },

    /// The spender's allowance from the owner does not cover the transfer.
    #[error(
        "insufficient allowance: {spender} may spend {available} of {owner}'s funds, requested {requested}"
    )]
    InsufficientAllowance {
        /// The account whose funds are being spent.
        owner: Address,
        /// The account spending on the owner's behalf.
        spender: Address,
        /// Allowance currently granted.
        available: u64,
        /// Units requested.
        requested: u64,
    },

    /// Minting the requested amount would overflow the total supply.
    #[error("supply overflow: minting {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u64,
    },

    /// The caller is not the ledger's mint/burn authority.
    #[error("not authorized: {caller} is not the ledger authority")]
    NotAuthorized {
        /// The rejected caller.
        caller: Address,
    },
}

// ---------------------------------------------------------------------------
// Capability Traits
// ---------------------------------------------------------------------------

/// The pegged-token ledger the vault mints into and burns from.
///
/// Mint and burn are gated to a single mutable authority; the hosting
/// environment crowns the vault's custody address over the ledger before
/// the engine goes live (see [`transfer_authority`](Self::transfer_authority)).
pub trait PegLedger: Send + Sync {
    /// Mints `amount` units to `to`. Fails with [`LedgerError::NotAuthorized`]
    /// unless `caller` is the current authority.
    fn mint(&self, caller: &Address, to: &Address, amount: u64) -> Result<(), LedgerError>;

    /// Burns `amount` units from `from`. Authority-gated like mint.
    fn burn(&self, caller: &Address, from: &Address, amount: u64) -> Result<(), LedgerError>;

    /// Moves `amount` units from `owner` to `to`, spending `spender`'s
    /// allowance from `owner`.
    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Units currently held by `account`.
    fn balance_of(&self, account: &Address) -> u64;

    /// Remaining allowance granted by `owner` to `spender`.
    fn allowance(&self, owner: &Address, spender: &Address) -> u64;

    /// Total units in circulation.
    fn total_supply(&self) -> u64;

    /// Hands the mint/burn authority to `new_authority`. Only the current
    /// authority may call this.
    fn transfer_authority(
        &self,
        caller: &Address,
        new_authority: &Address,
    ) -> Result<(), LedgerError>;

    /// The current mint/burn authority.
    fn authority(&self) -> Address;
}

/// A reserve-asset ledger: standard fungible transfer bookkeeping for one
/// deposited asset. The vault holds custody balances in these ledgers and
/// pulls deposits from callers via allowance.
pub trait AssetLedger: Send + Sync {
    /// Moves `amount` units from `from` to `to` on the owner's behalf.
    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError>;

    /// Moves `amount` units from `owner` to `to`, spending `spender`'s
    /// allowance from `owner`.
    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Units currently held by `account`.
    fn balance_of(&self, account: &Address) -> u64;

    /// Remaining allowance granted by `owner` to `spender`.
    fn allowance(&self, owner: &Address, spender: &Address) -> u64;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
