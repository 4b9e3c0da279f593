//! # Scenario Runner
//!
//! Wires a [`Vault`] to in-memory ledgers and oracles, then drives one full
//! lifecycle through it: bless every configured reserve, deposit against
//! each, let the vesting period elapse, redeem the vested bonuses, reprove
//! part of the position, and sweep the tax-derived free reserve to cold
//! storage. The resulting [`ScenarioReport`] is a complete, serializable
//! record of what moved — balances, custody, free reserves, and the
//! vault's own event log.
//!
//! Scenario configs are plain JSON documents; see [`ScenarioConfig::load`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use aurum_protocol::ledger::{Address, AssetLedger, MemoryLedger, PegLedger, ReserveId};
use aurum_protocol::oracle::FixedRateOracle;
use aurum_protocol::vault::{ReserveConfig, Vault, VaultEvent};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One reserve asset to bless and exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSpec {
    /// Human-readable asset name (e.g., "USD Coin").
    pub name: String,
    /// Ticker symbol (e.g., "USDC").
    pub symbol: String,
    /// Issuer label folded into the content-addressed reserve ID.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Mint withholding rate, in basis points.
    pub minting_interest_rate_bps: u32,
    /// Per-reserve tax rate accrued at mint time, in basis points.
    pub burning_tax_rate_bps: u32,
    /// Vesting delay, in blocks.
    pub vesting_period_blocks: u64,
    /// Oracle premium over parity, in basis points. 0 means 1:1.
    #[serde(default)]
    pub oracle_premium_bps: u32,
    /// When true, mint and burn are rejected for this asset.
    #[serde(default)]
    pub disabled: bool,
    /// When true, redemptions against this asset are permitted.
    #[serde(default = "default_true")]
    pub reprove_whitelisted: bool,
    /// Reserve units the depositor starts with.
    pub depositor_funding: u64,
    /// Pegged units to mint against this reserve.
    pub praise_amount: u64,
    /// Pegged units to redeem after vesting. Zero skips the redemption leg.
    #[serde(default)]
    pub reprove_amount: u64,
}

fn default_issuer() -> String {
    "aurum:issuer".to_string()
}

fn default_true() -> bool {
    true
}

/// A complete scenario: the vault-wide tax plus the reserves to exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Display name, echoed into logs and the report.
    pub name: String,
    /// Vault-wide redemption tax, in basis points.
    pub tax_rate_bps: u32,
    /// Reserves to bless and exercise, in order.
    pub reserves: Vec<ReserveSpec>,
}

impl ScenarioConfig {
    /// Loads a scenario from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scenario file: {}", path.display()))
    }

    /// The built-in two-reserve scenario used when no config file is given:
    /// a parity stable reserve and a premium-priced one, 10% withholding,
    /// 20% tax, 5-block vesting.
    pub fn builtin() -> Self {
        const ONE: u64 = 1_000_000_000_000_000_000;
        Self {
            name: "builtin-two-reserves".to_string(),
            tax_rate_bps: 2_000,
            reserves: vec![
                ReserveSpec {
                    name: "USD Coin".to_string(),
                    symbol: "USDC".to_string(),
                    issuer: default_issuer(),
                    minting_interest_rate_bps: 1_000,
                    burning_tax_rate_bps: 2_000,
                    vesting_period_blocks: 5,
                    oracle_premium_bps: 0,
                    disabled: false,
                    reprove_whitelisted: true,
                    depositor_funding: 10 * ONE,
                    praise_amount: ONE,
                    reprove_amount: ONE / 2,
                },
                ReserveSpec {
                    name: "Dai Stablecoin".to_string(),
                    symbol: "DAI".to_string(),
                    issuer: default_issuer(),
                    minting_interest_rate_bps: 1_000,
                    burning_tax_rate_bps: 2_000,
                    vesting_period_blocks: 8,
                    oracle_premium_bps: 1_000,
                    disabled: false,
                    reprove_whitelisted: true,
                    depositor_funding: 10 * ONE,
                    praise_amount: ONE,
                    reprove_amount: 0,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Final state of one reserve after the scenario ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveReport {
    pub symbol: String,
    /// Hex-encoded content-addressed reserve ID.
    pub reserve_id: String,
    /// Reserve units left in vault custody.
    pub custody_balance: u64,
    /// Tracked tax-derived balance (after the free-reserve sweep).
    pub free_reserve: u64,
    /// The depositor's remaining reserve-asset balance.
    pub depositor_balance: u64,
    /// Reserve units swept to cold storage from the free reserve.
    pub free_reserve_swept: u64,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub run_id: Uuid,
    pub scenario: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Block height when the run finished.
    pub final_block: u64,
    pub peg_total_supply: u64,
    pub depositor_peg_balance: u64,
    pub treasury_peg_balance: u64,
    /// Pegged units still locked in the depositor's vesting queue.
    pub depositor_pending_vesting: u64,
    pub reserves: Vec<ReserveReport>,
    /// The vault's full signal log, in emission order.
    pub events: Vec<VaultEvent>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Runs a scenario end to end against fresh in-memory state.
pub fn run(config: &ScenarioConfig) -> Result<ScenarioReport> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();

    let crown = Address::new("aurum:crown");
    let depositor = Address::new("aurum:depositor");
    let treasury = Address::new("aurum:treasury");
    let cold = Address::new("aurum:cold");
    let custody = Address::new("aurum:vault");

    // The pegged token, crowned over to the vault's custody address.
    let peg = Arc::new(MemoryLedger::new("AURUM USD", "aUSD", crown.clone()));
    peg.transfer_authority(&crown, &custody)
        .context("failed to crown the vault over the peg ledger")?;

    let mut vault = Vault::new(
        custody.clone(),
        peg.clone() as Arc<dyn PegLedger>,
        crown.clone(),
        treasury.clone(),
        config.tax_rate_bps,
    )
    .context("failed to construct vault")?;

    // Bless every reserve and run the deposit leg.
    let mut assets: Vec<(ReserveId, Arc<MemoryLedger>)> = Vec::new();
    for spec in &config.reserves {
        let asset = Arc::new(MemoryLedger::with_supply(
            &spec.name,
            &spec.symbol,
            Address::new(spec.issuer.clone()),
            &depositor,
            spec.depositor_funding,
        ));
        let reserve = ReserveId::derive(&spec.name, &spec.symbol, &spec.issuer);

        vault
            .bless(
                &crown,
                reserve,
                ReserveConfig {
                    minting_interest_rate_bps: spec.minting_interest_rate_bps,
                    burning_tax_rate_bps: spec.burning_tax_rate_bps,
                    vesting_period_blocks: spec.vesting_period_blocks,
                    oracle: Arc::new(FixedRateOracle::with_premium_bps(spec.oracle_premium_bps)),
                    ledger: asset.clone() as Arc<dyn AssetLedger>,
                    disabled: spec.disabled,
                    reprove_whitelisted: spec.reprove_whitelisted,
                },
            )
            .with_context(|| format!("bless failed for {}", spec.symbol))?;

        if !spec.disabled && spec.praise_amount > 0 {
            let estimate = vault
                .praise_estimates(&reserve, spec.praise_amount)
                .with_context(|| format!("estimate failed for {}", spec.symbol))?;
            asset.approve(&depositor, &custody, estimate.reserve_needed);
            vault
                .praise(&depositor, reserve, &depositor, spec.praise_amount)
                .with_context(|| format!("praise failed for {}", spec.symbol))?;
        }

        assets.push((reserve, asset));
    }

    // Let every vesting period elapse, then redeem the bonuses.
    let longest_vesting = config
        .reserves
        .iter()
        .map(|spec| spec.vesting_period_blocks)
        .max()
        .unwrap_or(0);
    vault.advance_blocks(longest_vesting);
    let redeemed = vault
        .redeem_vestings(&depositor)
        .context("vesting redemption failed")?;
    tracing::info!(redeemed, "vesting bonuses redeemed");

    // Redemption leg.
    for (spec, (reserve, _asset)) in config.reserves.iter().zip(&assets) {
        if spec.disabled || !spec.reprove_whitelisted || spec.reprove_amount == 0 {
            continue;
        }
        let tax = (spec.reprove_amount as u128 * config.tax_rate_bps as u128 / 10_000) as u64;
        peg.approve(&depositor, &custody, tax);
        vault
            .reprove(&depositor, *reserve, spec.reprove_amount)
            .with_context(|| format!("reprove failed for {}", spec.symbol))?;
    }

    // Sweep whatever tax accrual remains withdrawable.
    let mut swept: Vec<u64> = Vec::new();
    for (reserve, _asset) in &assets {
        let tracked = vault.free_reserve_of(reserve);
        let out = if tracked > 0 {
            vault
                .withdraw_free_reserve(&crown, *reserve, &cold, tracked)
                .context("free-reserve sweep failed")?
        } else {
            0
        };
        swept.push(out);
    }

    // Assemble the report.
    let reserves = config
        .reserves
        .iter()
        .zip(&assets)
        .zip(&swept)
        .map(|((spec, (reserve, asset)), swept_out)| ReserveReport {
            symbol: spec.symbol.clone(),
            reserve_id: reserve.to_hex(),
            custody_balance: AssetLedger::balance_of(&**asset, &custody),
            free_reserve: vault.free_reserve_of(reserve),
            depositor_balance: AssetLedger::balance_of(&**asset, &depositor),
            free_reserve_swept: *swept_out,
        })
        .collect();

    let depositor_pending_vesting = vault
        .vesting_queue(&depositor)
        .iter()
        .map(|entry| entry.amount)
        .sum();

    Ok(ScenarioReport {
        run_id,
        scenario: config.name.clone(),
        started_at,
        finished_at: Utc::now(),
        final_block: vault.current_block(),
        peg_total_supply: peg.total_supply(),
        depositor_peg_balance: PegLedger::balance_of(&*peg, &depositor),
        treasury_peg_balance: PegLedger::balance_of(&*peg, &treasury),
        depositor_pending_vesting,
        reserves,
        events: vault.take_events(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
