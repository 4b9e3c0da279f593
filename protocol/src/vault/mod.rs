//! # Vault Module — The Reserve-Backed Stablecoin Engine
//!
//! The vault is where AURUM's money logic lives. Deposits, mints, vesting,
//! redemptions, tax accounting, and authority-gated withdrawals all pass
//! through here. If the ledger traits are the circulatory system, the vault
//! is the heart — it decides what moves, when, and under whose seal.
//!
//! ## Architecture
//!
//! ```text
//! engine.rs        — Vault: praise/reprove hot paths, withdrawals, bless
//! registry.rs      — ReserveConfig records, ordered enumeration, whitelist
//! vesting.rs       — Per-account FIFO queues of time-locked mint bonuses
//! free_reserve.rs  — Tax-derived reserve balances available to the crown
//! authority.rs     — The crown: one transferable admin authority
//! events.rs        — Typed signals appended by every state change
//! error.rs         — The full failure taxonomy, one enum
//! ```
//!
//! ## Design Principles
//!
//! 1. **Atomic-per-call.** Every public operation validates everything it
//!    will need — authority, registry state, balances, allowances, supply
//!    headroom — before its first mutation. A failure leaves no trace.
//! 2. **The crown gates configuration and withdrawal, never participation.**
//!    Minting, redeeming, and vesting redemption are open calls.
//! 3. **Block height is injected.** The engine owns a counter the host
//!    advances; nothing in here reads a clock.
//! 4. **Events are the audit trail.** State changes append typed signals
//!    the host drains; logging is a side channel, not the record.

pub mod authority;
pub mod engine;
pub mod error;
pub mod events;
pub mod free_reserve;
pub mod registry;
pub mod vesting;

pub use authority::Crown;
pub use engine::{PraiseEstimate, Vault};
pub use error::VaultError;
pub use events::VaultEvent;
pub use free_reserve::FreeReserveBook;
pub use registry::{ReserveConfig, ReserveRegistry};
pub use vesting::{VestingEntry, VestingInfo, VestingLedger};
