//! # Reserve Oracles
//!
//! Conversion between reserve-asset units and pegged-token units. Every
//! registered reserve carries exactly one oracle handle; the engine calls
//! it synchronously and trusts the answer — defending against a dishonest
//! oracle is explicitly out of scope for the vault core.

use crate::config::BPS_DENOMINATOR;

/// Conversion authority for a single reserve asset.
///
/// Implementations must be pure and deterministic per call: the engine may
/// invoke a conversion several times within one operation (estimate, pull,
/// accrual) and assumes all calls agree.
pub trait ReserveOracle: Send + Sync {
    /// Converts reserve-asset units into pegged-token units.
    fn to_peg(&self, reserve_amount: u64) -> u64;

    /// Converts pegged-token units into reserve-asset units.
    fn to_reserve(&self, peg_amount: u64) -> u64;
}

/// A fixed rational exchange rate: `numerator / denominator` reserve units
/// per pegged unit.
///
/// Math runs through `u128` intermediates with truncating division, and
/// saturates at `u64::MAX` on results that cannot fit — a rate so extreme
/// it only appears in adversarial configurations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedRateOracle {
    reserve_numerator: u64,
    reserve_denominator: u64,
}

impl FixedRateOracle {
    /// Creates an oracle quoting `reserve_numerator / reserve_denominator`
    /// reserve units per pegged unit.
    ///
    /// # Panics
    ///
    /// Panics if either term is zero — a zero rate would make one of the
    /// two conversion directions divide by zero.
    pub fn new(reserve_numerator: u64, reserve_denominator: u64) -> Self {
        assert!(
            reserve_numerator > 0 && reserve_denominator > 0,
            "oracle rate terms must be nonzero"
        );
        Self {
            reserve_numerator,
            reserve_denominator,
        }
    }

    /// A 1:1 oracle — one reserve unit per pegged unit.
    pub fn parity() -> Self {
        Self::new(1, 1)
    }

    /// An oracle quoting `premium_bps` basis points above parity, e.g.
    /// `with_premium_bps(1000)` quotes 1.1 reserve units per pegged unit.
    pub fn with_premium_bps(premium_bps: u32) -> Self {
        Self::new(BPS_DENOMINATOR + premium_bps as u64, BPS_DENOMINATOR)
    }
}

impl ReserveOracle for FixedRateOracle {
    fn to_peg(&self, reserve_amount: u64) -> u64 {
        let scaled =
            reserve_amount as u128 * self.reserve_denominator as u128 / self.reserve_numerator as u128;
        scaled.min(u64::MAX as u128) as u64
    }

    fn to_reserve(&self, peg_amount: u64) -> u64 {
        let scaled =
            peg_amount as u128 * self.reserve_numerator as u128 / self.reserve_denominator as u128;
        scaled.min(u64::MAX as u128) as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
