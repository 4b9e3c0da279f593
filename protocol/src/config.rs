//! # Protocol Configuration & Constants
//!
//! Every magic number in AURUM lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.

// ---------------------------------------------------------------------------
// Fixed-Point Rates
// ---------------------------------------------------------------------------

/// Basis-point denominator: 10_000 bps = 100%.
///
/// All protocol rates — mint withholding, mint-side tax accrual, and the
/// vault-wide redemption tax — are expressed in basis points and resolved
/// with truncating integer division against this denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for any rate parameter. A rate above 100% would let the
/// withheld or taxed portion exceed the principal, so configuration rejects
/// it outright rather than letting the arithmetic underflow downstream.
pub const MAX_RATE_BPS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Engine version string, taken from the crate manifest at compile time.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
