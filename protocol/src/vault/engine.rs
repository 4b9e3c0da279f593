//! # The Vault Engine
//!
//! Ties the registry, vesting ledger, free-reserve book, and crown together
//! behind the public operation surface: `bless`, `praise`, `reprove`,
//! vesting redemption, and the withdrawal family.
//!
//! ## Atomicity
//!
//! The hosting environment gives us serialized execution but no rollback,
//! so every operation is written in two phases: a read-only pre-flight that
//! verifies each condition a later step depends on (authority, registry
//! state, balances, allowances, supply headroom, counter headroom), then
//! the effect phase whose calls can no longer fail. A failure anywhere in
//! pre-flight leaves the vault, the ledgers, and the event log untouched.
//!
//! ## External-call ordering
//!
//! Within the effect phase the ordering follows the reentrancy discipline
//! of the protocol design: the reserve pull precedes the peg mint on
//! deposit, and the peg burn precedes the reserve release on redemption.
//! Reentrancy safety is not formally verified; ledger implementations are
//! trusted not to call back into the vault.

use std::sync::Arc;

use super::authority::Crown;
use super::error::VaultError;
use super::events::VaultEvent;
use super::free_reserve::FreeReserveBook;
use super::registry::{ReserveConfig, ReserveRegistry};
use super::vesting::{VestingEntry, VestingInfo, VestingLedger};
use crate::config::{BPS_DENOMINATOR, MAX_RATE_BPS};
use crate::ledger::{Address, AssetLedger, LedgerError, PegLedger, ReserveId};
use crate::oracle::ReserveOracle;

/// Truncating basis-point share of an amount.
///
/// `rate_bps` is validated against [`MAX_RATE_BPS`] wherever it enters the
/// vault, so the result always fits back into `u64`.
fn bps_share(amount: u64, rate_bps: u32) -> u64 {
    (amount as u128 * rate_bps as u128 / BPS_DENOMINATOR as u128) as u64
}

/// Projection of what a deposit will move, before it happens.
///
/// `immediate_amount` is the post-withhold amount `praise` actually mints
/// to the depositor; `vest_amount` goes into the vesting queue. The two
/// always sum to the requested amount exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PraiseEstimate {
    /// Reserve units pulled from the caller — backing for the full
    /// requested amount, vested bonus included.
    pub reserve_needed: u64,
    /// Pegged units minted to the depositor immediately.
    pub immediate_amount: u64,
    /// Pegged units withheld into the vesting queue.
    pub vest_amount: u64,
}

/// The reserve-backed stablecoin engine.
///
/// All mutating operations take `&mut self`; the borrow checker enforces
/// the serialized, atomic-per-call execution model the design assumes.
pub struct Vault {
    /// The vault's own custody account inside every ledger it touches.
    address: Address,
    crown: Crown,
    /// Recipient of the redemption tax.
    treasury: Address,
    /// Vault-wide redemption tax rate, fixed relative to per-reserve rates:
    /// reprove uses this, never the per-reserve burn rate.
    tax_rate_bps: u32,
    peg: Arc<dyn PegLedger>,
    registry: ReserveRegistry,
    vesting: VestingLedger,
    free_reserves: FreeReserveBook,
    events: Vec<VaultEvent>,
    block_number: u64,
}

impl Vault {
    /// Creates a vault with no blessed reserves at block 0.
    ///
    /// `address` is the custody account the host must crown over the peg
    /// ledger before deposits can mint. Fails with
    /// [`VaultError::RateOutOfRange`] for a tax rate above 100%.
    pub fn new(
        address: Address,
        peg: Arc<dyn PegLedger>,
        crown: Address,
        treasury: Address,
        tax_rate_bps: u32,
    ) -> Result<Self, VaultError> {
        require_rate(tax_rate_bps)?;
        Ok(Self {
            address,
            crown: Crown::new(crown),
            treasury,
            tax_rate_bps,
            peg,
            registry: ReserveRegistry::new(),
            vesting: VestingLedger::new(),
            free_reserves: FreeReserveBook::new(),
            events: Vec::new(),
            block_number: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Configuration (crown-gated)
    // -----------------------------------------------------------------------

    /// Registers or updates a reserve asset.
    ///
    /// Upserts the config: a new asset is appended to the enumeration order
    /// exactly once; re-blessing overwrites in place. Always emits
    /// [`VaultEvent::ReserveRegistered`]; emits
    /// [`VaultEvent::ReproveWhitelistUpdated`] only when whitelist
    /// membership actually changed.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] unless the caller holds the crown;
    /// [`VaultError::RateOutOfRange`] for rates above 10_000 bps.
    pub fn bless(
        &mut self,
        caller: &Address,
        reserve: ReserveId,
        config: ReserveConfig,
    ) -> Result<(), VaultError> {
        self.crown.require(caller)?;
        require_rate(config.minting_interest_rate_bps)?;
        require_rate(config.burning_tax_rate_bps)?;

        let minting_interest_rate_bps = config.minting_interest_rate_bps;
        let burning_tax_rate_bps = config.burning_tax_rate_bps;
        let vesting_period_blocks = config.vesting_period_blocks;
        let disabled = config.disabled;
        let reprove_whitelisted = config.reprove_whitelisted;

        let delta = self.registry.upsert(reserve, config);

        self.events.push(VaultEvent::ReserveRegistered {
            reserve,
            index: delta.index as u64,
            effective_block: self.block_number,
            minting_interest_rate_bps,
            burning_tax_rate_bps,
            vesting_period_blocks,
            disabled,
            reprove_whitelisted,
        });
        if let Some(whitelisted) = delta.whitelist_change {
            self.events.push(VaultEvent::ReproveWhitelistUpdated {
                reserve,
                whitelisted,
            });
        }

        tracing::info!(
            reserve = %reserve,
            new = delta.is_new,
            "reserve blessed"
        );
        Ok(())
    }

    /// Passes the crown to a new holder.
    pub fn transfer_authority(
        &mut self,
        caller: &Address,
        new_crown: Address,
    ) -> Result<(), VaultError> {
        self.crown.require(caller)?;
        let previous = self.crown.pass_to(new_crown.clone());
        self.events.push(VaultEvent::CrownPassed {
            previous,
            crown: new_crown,
        });
        Ok(())
    }

    /// Re-points the redemption-tax recipient.
    pub fn update_treasury(
        &mut self,
        caller: &Address,
        treasury: Address,
    ) -> Result<(), VaultError> {
        self.crown.require(caller)?;
        self.treasury = treasury.clone();
        self.events.push(VaultEvent::TreasuryUpdated { treasury });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Minting
    // -----------------------------------------------------------------------

    /// Projects what a deposit of `peg_amount` against `reserve` would move,
    /// without mutating anything.
    ///
    /// # Errors
    ///
    /// [`VaultError::UnknownReserve`] then [`VaultError::ReserveDisabled`],
    /// in that order.
    pub fn praise_estimates(
        &self,
        reserve: &ReserveId,
        peg_amount: u64,
    ) -> Result<PraiseEstimate, VaultError> {
        let config = self.registry.require_enabled(reserve)?;
        let vest_amount = bps_share(peg_amount, config.minting_interest_rate_bps);
        // vest_amount <= peg_amount because the rate is capped at 100%.
        let immediate_amount = peg_amount - vest_amount;
        let reserve_needed = config.oracle.to_reserve(peg_amount);
        Ok(PraiseEstimate {
            reserve_needed,
            immediate_amount,
            vest_amount,
        })
    }

    /// Deposits reserve assets and mints pegged tokens.
    ///
    /// Open call: any caller may mint on behalf of any depositor, provided
    /// the reserve pull from the caller succeeds. The pull covers the full
    /// requested amount — the vested bonus is backed from the moment of
    /// deposit. Returns the estimate that was executed.
    ///
    /// # Errors
    ///
    /// Registry preconditions as [`praise_estimates`](Self::praise_estimates);
    /// ledger conditions ([`LedgerError`]) surface unchanged.
    pub fn praise(
        &mut self,
        caller: &Address,
        reserve: ReserveId,
        depositor: &Address,
        peg_amount: u64,
    ) -> Result<PraiseEstimate, VaultError> {
        let estimate = self.praise_estimates(&reserve, peg_amount)?;
        let (oracle, asset, burn_rate_bps, vesting_period_blocks) = {
            let config = self.registry.require_enabled(&reserve)?;
            (
                Arc::clone(&config.oracle),
                Arc::clone(&config.ledger),
                config.burning_tax_rate_bps,
                config.vesting_period_blocks,
            )
        };

        // Mint-side tax accrual, converted to reserve units as it lands.
        let accrual = oracle.to_reserve(bps_share(peg_amount, burn_rate_bps));

        // Pre-flight: everything the effect phase depends on.
        let unlock_block = self
            .block_number
            .checked_add(vesting_period_blocks)
            .ok_or(VaultError::AmountOverflow)?;
        let held = asset.balance_of(caller);
        if held < estimate.reserve_needed {
            return Err(LedgerError::InsufficientBalance {
                account: caller.clone(),
                available: held,
                requested: estimate.reserve_needed,
            }
            .into());
        }
        let granted = asset.allowance(caller, &self.address);
        if granted < estimate.reserve_needed {
            return Err(LedgerError::InsufficientAllowance {
                owner: caller.clone(),
                spender: self.address.clone(),
                available: granted,
                requested: estimate.reserve_needed,
            }
            .into());
        }
        if self
            .peg
            .total_supply()
            .checked_add(estimate.immediate_amount)
            .is_none()
        {
            return Err(LedgerError::SupplyOverflow {
                amount: estimate.immediate_amount,
            }
            .into());
        }
        if self.free_reserves.would_overflow(&reserve, accrual) {
            return Err(VaultError::AmountOverflow);
        }

        // Effects: pull the backing, mint the immediate slice, queue the
        // vested slice, accrue the tax.
        asset.transfer_from(&self.address, caller, &self.address, estimate.reserve_needed)?;
        self.peg
            .mint(&self.address, depositor, estimate.immediate_amount)?;
        self.vesting.append(
            depositor,
            VestingEntry {
                amount: estimate.vest_amount,
                unlock_block,
            },
        );
        self.free_reserves.accrue(&reserve, accrual)?;

        self.events.push(VaultEvent::Praised {
            reserve,
            depositor: depositor.clone(),
            peg_amount,
        });
        tracing::info!(
            reserve = %reserve,
            depositor = %depositor,
            peg_amount,
            reserve_pulled = estimate.reserve_needed,
            "praise executed"
        );
        Ok(estimate)
    }

    // -----------------------------------------------------------------------
    // Vesting
    // -----------------------------------------------------------------------

    /// Read-only view of an account's vesting queue, oldest first.
    pub fn vesting_queue(&self, account: &Address) -> &[VestingEntry] {
        self.vesting.queue(account)
    }

    /// Redeemable sum and total entry count for an account at the current
    /// block.
    pub fn vesting_info(&self, account: &Address) -> VestingInfo {
        self.vesting.info(account, self.block_number)
    }

    /// Redeems every unlocked vesting entry for `account`, minting the sum
    /// to them. Open call — anyone may trigger it, only `account` benefits.
    ///
    /// Locked entries survive in their original order. A zero unlocked sum
    /// is a valid no-op; [`VaultEvent::VestingRedeemed`] fires only for
    /// nonzero sums. Returns the amount minted.
    pub fn redeem_vestings(&mut self, account: &Address) -> Result<u64, VaultError> {
        let total = self.vesting.unlocked_total(account, self.block_number);

        if total > 0 {
            if self.peg.total_supply().checked_add(total).is_none() {
                return Err(LedgerError::SupplyOverflow { amount: total }.into());
            }
            self.peg.mint(&self.address, account, total)?;
        }
        self.vesting.clear_unlocked(account, self.block_number);

        if total > 0 {
            self.events.push(VaultEvent::VestingRedeemed {
                account: account.clone(),
                amount: total,
            });
            tracing::info!(account = %account, amount = total, "vesting redeemed");
        }
        Ok(total)
    }

    // -----------------------------------------------------------------------
    // Redemption
    // -----------------------------------------------------------------------

    /// Burns pegged tokens for reserve assets.
    ///
    /// The vault-wide tax slice moves from the caller to the treasury; the
    /// remainder is burned and released as reserve units at the oracle
    /// rate. The free-reserve book is untouched here — its accrual already
    /// happened at mint time, and adding the peg-denominated tax again
    /// would double-count.
    ///
    /// # Errors
    ///
    /// In order: [`VaultError::UnknownReserve`],
    /// [`VaultError::ReserveDisabled`],
    /// [`VaultError::NotWhitelistedForRedemption`]; then ledger conditions
    /// unchanged. Returns the reserve units released.
    pub fn reprove(
        &mut self,
        caller: &Address,
        reserve: ReserveId,
        peg_amount: u64,
    ) -> Result<u64, VaultError> {
        let (oracle, asset) = {
            self.registry.require_enabled(&reserve)?;
            let config = self.registry.require_reprove_whitelisted(&reserve)?;
            (Arc::clone(&config.oracle), Arc::clone(&config.ledger))
        };

        let tax = bps_share(peg_amount, self.tax_rate_bps);
        // tax <= peg_amount because the rate is capped at 100%.
        let net = peg_amount - tax;
        let reserve_out = oracle.to_reserve(net);

        // Pre-flight: the burn and the tax transfer both draw on the
        // caller's peg balance, so check the combined amount up front.
        let held = self.peg.balance_of(caller);
        if held < peg_amount {
            return Err(LedgerError::InsufficientBalance {
                account: caller.clone(),
                available: held,
                requested: peg_amount,
            }
            .into());
        }
        let granted = self.peg.allowance(caller, &self.address);
        if granted < tax {
            return Err(LedgerError::InsufficientAllowance {
                owner: caller.clone(),
                spender: self.address.clone(),
                available: granted,
                requested: tax,
            }
            .into());
        }
        let custody = asset.balance_of(&self.address);
        if custody < reserve_out {
            return Err(LedgerError::InsufficientBalance {
                account: self.address.clone(),
                available: custody,
                requested: reserve_out,
            }
            .into());
        }

        // Effects: burn first, then the tax transfer, then the release.
        self.peg.burn(&self.address, caller, net)?;
        if tax > 0 {
            self.peg
                .transfer_from(&self.address, caller, &self.treasury, tax)?;
        }
        asset.transfer(&self.address, caller, reserve_out)?;

        self.events.push(VaultEvent::Reproved {
            reserve,
            account: caller.clone(),
            peg_amount,
        });
        tracing::info!(
            reserve = %reserve,
            account = %caller,
            peg_amount,
            reserve_out,
            "reprove executed"
        );
        Ok(reserve_out)
    }

    // -----------------------------------------------------------------------
    // Withdrawals (crown-gated)
    // -----------------------------------------------------------------------

    /// Withdraws against the tax-derived free reserve, bounded by the
    /// tracked counter. Returns the reserve units transferred.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`], [`VaultError::UnknownReserve`], then
    /// [`VaultError::MaxAmountExceeded`] when the request exceeds the
    /// tracked balance.
    pub fn withdraw_free_reserve(
        &mut self,
        caller: &Address,
        reserve: ReserveId,
        to: &Address,
        peg_amount: u64,
    ) -> Result<u64, VaultError> {
        self.crown.require(caller)?;
        let (oracle, asset) = {
            let config = self.registry.require_exists(&reserve)?;
            (Arc::clone(&config.oracle), Arc::clone(&config.ledger))
        };

        let available = self.free_reserves.available(&reserve);
        if peg_amount > available {
            return Err(VaultError::MaxAmountExceeded {
                reserve,
                requested: peg_amount,
                available,
            });
        }
        let reserve_out = oracle.to_reserve(peg_amount);
        let custody = asset.balance_of(&self.address);
        if custody < reserve_out {
            return Err(LedgerError::InsufficientBalance {
                account: self.address.clone(),
                available: custody,
                requested: reserve_out,
            }
            .into());
        }

        asset.transfer(&self.address, to, reserve_out)?;
        self.free_reserves.debit(&reserve, peg_amount)?;

        self.events.push(VaultEvent::FreeReserveWithdrawn {
            reserve,
            to: to.clone(),
            peg_amount,
            reserve_amount: reserve_out,
        });
        Ok(reserve_out)
    }

    /// Withdraws reserve units outright and resets the asset's free-reserve
    /// counter — after a full drain, tracking tax provenance is meaningless.
    ///
    /// Permitted on disabled reserves; only registration is required.
    pub fn withdraw_reserve(
        &mut self,
        caller: &Address,
        reserve: ReserveId,
        to: &Address,
        reserve_amount: u64,
    ) -> Result<(), VaultError> {
        self.crown.require(caller)?;
        let asset = Arc::clone(&self.registry.require_exists(&reserve)?.ledger);

        asset.transfer(&self.address, to, reserve_amount)?;
        self.free_reserves.reset(&reserve);

        self.events.push(VaultEvent::ReserveWithdrawn {
            reserve,
            to: to.clone(),
            reserve_amount,
        });
        tracing::info!(reserve = %reserve, to = %to, reserve_amount, "reserve withdrawn");
        Ok(())
    }

    /// Withdraws the full custody balance of every registered reserve, in
    /// bless order. Zero-balance assets are silently skipped; an empty
    /// registry is a valid no-op.
    pub fn withdraw_all(&mut self, caller: &Address, to: &Address) -> Result<(), VaultError> {
        self.crown.require(caller)?;

        let order: Vec<ReserveId> = self.registry.order().to_vec();
        for reserve in order {
            let Some(config) = self.registry.get(&reserve) else {
                continue;
            };
            let asset = Arc::clone(&config.ledger);
            let balance = asset.balance_of(&self.address);
            if balance == 0 {
                continue;
            }

            asset.transfer(&self.address, to, balance)?;
            self.free_reserves.reset(&reserve);
            self.events.push(VaultEvent::ReserveWithdrawn {
                reserve,
                to: to.clone(),
                reserve_amount: balance,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The vault's custody address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The current crown holder.
    pub fn crown(&self) -> &Address {
        self.crown.holder()
    }

    /// The redemption-tax recipient.
    pub fn treasury(&self) -> &Address {
        &self.treasury
    }

    /// The vault-wide redemption tax rate.
    pub fn tax_rate_bps(&self) -> u32 {
        self.tax_rate_bps
    }

    /// Number of assets ever blessed.
    pub fn reserve_count(&self) -> usize {
        self.registry.reserve_count()
    }

    /// The asset at `index` in bless order.
    pub fn reserve_at(&self, index: usize) -> Option<ReserveId> {
        self.registry.reserve_at(index)
    }

    /// True when the asset has been blessed at least once.
    pub fn is_registered(&self, reserve: &ReserveId) -> bool {
        self.registry.is_registered(reserve)
    }

    /// The config for a blessed reserve.
    pub fn reserve_config(&self, reserve: &ReserveId) -> Option<&ReserveConfig> {
        self.registry.get(reserve)
    }

    /// Number of assets currently whitelisted for redemption.
    pub fn whitelist_count(&self) -> usize {
        self.registry.whitelist_count()
    }

    /// The whitelisted asset at `index` in whitelist-insertion order.
    pub fn whitelist_at(&self, index: usize) -> Option<ReserveId> {
        self.registry.whitelist_at(index)
    }

    /// The tracked free-reserve balance for an asset.
    pub fn free_reserve_of(&self, reserve: &ReserveId) -> u64 {
        self.free_reserves.available(reserve)
    }

    /// The engine's current block height.
    pub fn current_block(&self) -> u64 {
        self.block_number
    }

    /// Advances the block height by one, returning the new height.
    pub fn advance_block(&mut self) -> u64 {
        self.advance_blocks(1)
    }

    /// Advances the block height by `blocks`, returning the new height.
    /// Saturates at `u64::MAX`.
    pub fn advance_blocks(&mut self, blocks: u64) -> u64 {
        self.block_number = self.block_number.saturating_add(blocks);
        self.block_number
    }

    /// The signals emitted so far, in order.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Drains and returns the event log.
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }
}

fn require_rate(rate_bps: u32) -> Result<(), VaultError> {
    if rate_bps > MAX_RATE_BPS {
        return Err(VaultError::RateOutOfRange { bps: rate_bps });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::oracle::FixedRateOracle;

    const ONE: u64 = 1_000_000_000_000_000_000;

    struct Harness {
        vault: Vault,
        peg: Arc<MemoryLedger>,
        asset: Arc<MemoryLedger>,
        reserve: ReserveId,
    }

    fn crown() -> Address {
        Address::new("aurum:crown")
    }

    fn user() -> Address {
        Address::new("aurum:user")
    }

    fn treasury() -> Address {
        Address::new("aurum:treasury")
    }

    fn vault_addr() -> Address {
        Address::new("aurum:vault")
    }

    /// Builds a vault with one blessed reserve: 10% mint withholding, 20%
    /// per-reserve tax, 5-block vesting, whitelisted, 10% oracle premium,
    /// and a vault-wide 20% redemption tax. The user starts with 10 ONE of
    /// the reserve asset.
    fn harness() -> Harness {
        let peg = Arc::new(MemoryLedger::new("AURUM USD", "aUSD", crown()));
        peg.transfer_authority(&crown(), &vault_addr()).unwrap();

        let asset = Arc::new(MemoryLedger::with_supply(
            "Mock Reserve",
            "MOCK",
            Address::new("aurum:issuer"),
            &user(),
            10 * ONE,
        ));

        let mut vault = Vault::new(
            vault_addr(),
            peg.clone() as Arc<dyn PegLedger>,
            crown(),
            treasury(),
            2_000,
        )
        .unwrap();

        let reserve = ReserveId::derive("Mock Reserve", "MOCK", "aurum:issuer");
        vault
            .bless(&crown(), reserve, sample_config(&asset, false, true))
            .unwrap();

        Harness {
            vault,
            peg,
            asset,
            reserve,
        }
    }

    fn sample_config(
        asset: &Arc<MemoryLedger>,
        disabled: bool,
        reprove_whitelisted: bool,
    ) -> ReserveConfig {
        ReserveConfig {
            minting_interest_rate_bps: 1_000,
            burning_tax_rate_bps: 2_000,
            vesting_period_blocks: 5,
            oracle: Arc::new(FixedRateOracle::with_premium_bps(1_000)),
            ledger: asset.clone() as Arc<dyn AssetLedger>,
            disabled,
            reprove_whitelisted,
        }
    }

    #[test]
    fn construction_rejects_tax_above_ceiling() {
        let peg = Arc::new(MemoryLedger::new("AURUM USD", "aUSD", crown()));
        let result = Vault::new(vault_addr(), peg, crown(), treasury(), 10_001);
        assert!(matches!(result, Err(VaultError::RateOutOfRange { .. })));
    }

    #[test]
    fn bless_requires_crown() {
        let mut h = harness();
        let config = sample_config(&h.asset, false, true);
        let result = h.vault.bless(&user(), h.reserve, config);
        assert!(matches!(result, Err(VaultError::Unauthorized { .. })));
    }

    #[test]
    fn bless_rejects_rates_above_ceiling() {
        let mut h = harness();
        let mut config = sample_config(&h.asset, false, true);
        config.minting_interest_rate_bps = 10_001;
        let result = h.vault.bless(&crown(), h.reserve, config);
        assert!(matches!(result, Err(VaultError::RateOutOfRange { .. })));
    }

    #[test]
    fn praise_estimates_split_exactly() {
        let h = harness();
        let est = h.vault.praise_estimates(&h.reserve, ONE).unwrap();

        assert_eq!(est.vest_amount, ONE / 10);
        assert_eq!(est.immediate_amount, ONE - ONE / 10);
        assert_eq!(est.immediate_amount + est.vest_amount, ONE);
        assert_eq!(est.reserve_needed, ONE + ONE / 10);
    }

    #[test]
    fn praise_estimates_rejects_unknown_and_disabled() {
        let mut h = harness();
        let ghost = ReserveId::derive("Ghost", "GST", "aurum:issuer");
        assert!(matches!(
            h.vault.praise_estimates(&ghost, ONE),
            Err(VaultError::UnknownReserve(_))
        ));

        h.vault
            .bless(&crown(), h.reserve, sample_config(&h.asset, true, true))
            .unwrap();
        assert!(matches!(
            h.vault.praise_estimates(&h.reserve, ONE),
            Err(VaultError::ReserveDisabled(_))
        ));
    }

    #[test]
    fn praise_pulls_reserve_and_mints_immediate() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);

        let est = h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();

        assert_eq!(PegLedger::balance_of(&*h.peg, &user()), est.immediate_amount);
        assert_eq!(
            AssetLedger::balance_of(&*h.asset, &vault_addr()),
            est.reserve_needed
        );
        // One vesting entry, unlocking after the configured period.
        let queue = h.vault.vesting_queue(&user());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].amount, est.vest_amount);
        assert_eq!(queue[0].unlock_block, h.vault.current_block() + 5);
        // Mint-side tax accrual: 20% of ONE, at the 1.1 oracle rate.
        assert_eq!(h.vault.free_reserve_of(&h.reserve), (ONE / 5) * 11 / 10);
    }

    #[test]
    fn praise_without_allowance_leaves_state_untouched() {
        let mut h = harness();
        // Balance exists but nothing is approved.
        let result = h.vault.praise(&user(), h.reserve, &user(), ONE);
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::InsufficientAllowance { .. }))
        ));

        assert_eq!(PegLedger::balance_of(&*h.peg, &user()), 0);
        assert_eq!(AssetLedger::balance_of(&*h.asset, &vault_addr()), 0);
        assert!(h.vault.vesting_queue(&user()).is_empty());
        assert_eq!(h.vault.free_reserve_of(&h.reserve), 0);
    }

    #[test]
    fn praise_without_balance_reports_insufficient_balance() {
        let mut h = harness();
        let pauper = Address::new("aurum:pauper");
        h.asset.approve(&pauper, &vault_addr(), 10 * ONE);

        let result = h.vault.praise(&pauper, h.reserve, &pauper, ONE);
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn redeem_vestings_after_period_mints_remainder() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();

        // One block early: nothing redeemable.
        h.vault.advance_blocks(4);
        assert_eq!(h.vault.redeem_vestings(&user()).unwrap(), 0);
        assert_eq!(h.vault.vesting_info(&user()).pending_count, 1);

        h.vault.advance_block();
        let redeemed = h.vault.redeem_vestings(&user()).unwrap();
        assert_eq!(redeemed, ONE / 10);
        assert_eq!(PegLedger::balance_of(&*h.peg, &user()), ONE);
        assert!(h.vault.vesting_queue(&user()).is_empty());
    }

    #[test]
    fn redeem_vestings_zero_sum_emits_no_event() {
        let mut h = harness();
        let before = h.vault.events().len();
        h.vault.redeem_vestings(&user()).unwrap();
        assert_eq!(h.vault.events().len(), before);
    }

    #[test]
    fn reprove_splits_burn_and_tax() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();
        h.vault.advance_blocks(5);
        h.vault.redeem_vestings(&user()).unwrap();

        // Vault-wide tax is 20%: burn 0.8, tax 0.2.
        let burn_amount = ONE;
        h.peg.approve(&user(), &vault_addr(), burn_amount);
        let reserve_out = h.vault.reprove(&user(), h.reserve, burn_amount).unwrap();

        let tax = burn_amount / 5;
        let net = burn_amount - tax;
        assert_eq!(reserve_out, net * 11 / 10);
        assert_eq!(PegLedger::balance_of(&*h.peg, &user()), 0);
        assert_eq!(PegLedger::balance_of(&*h.peg, &treasury()), tax);
        assert_eq!(AssetLedger::balance_of(&*h.asset, &user()), 10 * ONE - (ONE + ONE / 10) + reserve_out);
    }

    #[test]
    fn reprove_requires_whitelist() {
        let mut h = harness();
        h.vault
            .bless(&crown(), h.reserve, sample_config(&h.asset, false, false))
            .unwrap();

        let result = h.vault.reprove(&user(), h.reserve, ONE);
        assert!(matches!(
            result,
            Err(VaultError::NotWhitelistedForRedemption(_))
        ));
    }

    #[test]
    fn reprove_precondition_order_disabled_before_whitelist() {
        let mut h = harness();
        // Disabled AND unwhitelisted: the disabled check must win.
        h.vault
            .bless(&crown(), h.reserve, sample_config(&h.asset, true, false))
            .unwrap();

        let result = h.vault.reprove(&user(), h.reserve, ONE);
        assert!(matches!(result, Err(VaultError::ReserveDisabled(_))));
    }

    #[test]
    fn reprove_insufficient_peg_balance_is_atomic() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();

        // User holds 0.9 ONE immediately; ask to burn a full ONE.
        h.peg.approve(&user(), &vault_addr(), ONE);
        let result = h.vault.reprove(&user(), h.reserve, ONE + 1);
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        // Nothing moved.
        assert_eq!(PegLedger::balance_of(&*h.peg, &user()), ONE - ONE / 10);
        assert_eq!(PegLedger::balance_of(&*h.peg, &treasury()), 0);
    }

    #[test]
    fn withdraw_free_reserve_bounded_by_counter() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();

        let tracked = h.vault.free_reserve_of(&h.reserve);
        assert!(tracked > 0);

        let cold = Address::new("aurum:cold");
        let result = h
            .vault
            .withdraw_free_reserve(&crown(), h.reserve, &cold, tracked + 1);
        assert!(matches!(result, Err(VaultError::MaxAmountExceeded { .. })));

        let out = h
            .vault
            .withdraw_free_reserve(&crown(), h.reserve, &cold, tracked)
            .unwrap();
        assert_eq!(out, tracked * 11 / 10);
        assert_eq!(h.vault.free_reserve_of(&h.reserve), 0);
        assert_eq!(AssetLedger::balance_of(&*h.asset, &cold), out);
    }

    #[test]
    fn withdraw_reserve_resets_free_reserve() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();
        assert!(h.vault.free_reserve_of(&h.reserve) > 0);

        let cold = Address::new("aurum:cold");
        let custody = AssetLedger::balance_of(&*h.asset, &vault_addr());
        h.vault
            .withdraw_reserve(&crown(), h.reserve, &cold, custody)
            .unwrap();

        assert_eq!(h.vault.free_reserve_of(&h.reserve), 0);
        assert_eq!(AssetLedger::balance_of(&*h.asset, &cold), custody);
    }

    #[test]
    fn withdraw_reserve_allowed_on_disabled_reserve() {
        let mut h = harness();
        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();
        h.vault
            .bless(&crown(), h.reserve, sample_config(&h.asset, true, true))
            .unwrap();

        let cold = Address::new("aurum:cold");
        let result = h.vault.withdraw_reserve(&crown(), h.reserve, &cold, 1);
        assert!(result.is_ok());
    }

    #[test]
    fn withdraw_reserve_requires_crown_and_registration() {
        let mut h = harness();
        let cold = Address::new("aurum:cold");

        let result = h.vault.withdraw_reserve(&user(), h.reserve, &cold, 1);
        assert!(matches!(result, Err(VaultError::Unauthorized { .. })));

        let ghost = ReserveId::derive("Ghost", "GST", "aurum:issuer");
        let result = h.vault.withdraw_reserve(&crown(), ghost, &cold, 1);
        assert!(matches!(result, Err(VaultError::UnknownReserve(_))));
    }

    #[test]
    fn withdraw_all_skips_empty_reserves() {
        let mut h = harness();
        // Second reserve, never funded.
        let other_asset = Arc::new(MemoryLedger::new(
            "Second Reserve",
            "SEC",
            Address::new("aurum:issuer"),
        ));
        let other = ReserveId::derive("Second Reserve", "SEC", "aurum:issuer");
        h.vault
            .bless(&crown(), other, sample_config(&other_asset, false, true))
            .unwrap();

        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();
        let custody = AssetLedger::balance_of(&*h.asset, &vault_addr());

        let cold = Address::new("aurum:cold");
        h.vault.take_events();
        h.vault.withdraw_all(&crown(), &cold).unwrap();

        assert_eq!(AssetLedger::balance_of(&*h.asset, &cold), custody);
        // Exactly one withdrawal signal: the empty reserve stayed silent.
        let withdrawals = h
            .vault
            .events()
            .iter()
            .filter(|e| matches!(e, VaultEvent::ReserveWithdrawn { .. }))
            .count();
        assert_eq!(withdrawals, 1);
    }

    #[test]
    fn withdraw_all_with_no_reserves_is_noop() {
        let peg = Arc::new(MemoryLedger::new("AURUM USD", "aUSD", crown()));
        let mut vault =
            Vault::new(vault_addr(), peg, crown(), treasury(), 2_000).unwrap();
        assert!(vault.withdraw_all(&crown(), &Address::new("aurum:cold")).is_ok());
    }

    #[test]
    fn transfer_authority_moves_the_crown() {
        let mut h = harness();
        let heir = Address::new("aurum:heir");

        let result = h.vault.transfer_authority(&user(), heir.clone());
        assert!(matches!(result, Err(VaultError::Unauthorized { .. })));

        h.vault.transfer_authority(&crown(), heir.clone()).unwrap();
        assert_eq!(h.vault.crown(), &heir);

        // The old crown is locked out of gated operations.
        let config = sample_config(&h.asset, false, true);
        let result = h.vault.bless(&crown(), h.reserve, config);
        assert!(matches!(result, Err(VaultError::Unauthorized { .. })));
    }

    #[test]
    fn update_treasury_redirects_tax() {
        let mut h = harness();
        let chapel = Address::new("aurum:chapel");
        h.vault.update_treasury(&crown(), chapel.clone()).unwrap();

        h.asset.approve(&user(), &vault_addr(), 2 * ONE);
        h.vault.praise(&user(), h.reserve, &user(), ONE).unwrap();
        h.peg.approve(&user(), &vault_addr(), ONE / 2);
        h.vault.reprove(&user(), h.reserve, ONE / 2).unwrap();

        assert_eq!(PegLedger::balance_of(&*h.peg, &chapel), ONE / 10);
        assert_eq!(PegLedger::balance_of(&*h.peg, &treasury()), 0);
    }

    #[test]
    fn whitelist_signal_fires_only_on_change() {
        let mut h = harness();
        h.vault.take_events();

        // Same flag value: registration signal only.
        h.vault
            .bless(&crown(), h.reserve, sample_config(&h.asset, false, true))
            .unwrap();
        let events = h.vault.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], VaultEvent::ReserveRegistered { .. }));

        // Flag flips: both signals.
        h.vault
            .bless(&crown(), h.reserve, sample_config(&h.asset, false, false))
            .unwrap();
        let events = h.vault.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            VaultEvent::ReproveWhitelistUpdated {
                whitelisted: false,
                ..
            }
        ));
    }
}
