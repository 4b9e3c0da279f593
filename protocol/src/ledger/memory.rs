//! # In-Memory Reference Ledger
//!
//! A complete fungible ledger held in process memory: balances, allowances,
//! total supply, and a single mutable mint/burn authority. Implements both
//! [`PegLedger`] and [`AssetLedger`], so one type serves as the pegged
//! token and as every reserve asset in tests and local simulation.
//!
//! ## Concurrency
//!
//! All state sits behind a single `parking_lot::RwLock`, taken once per
//! operation. Reads take the shared lock; every mutation takes the
//! exclusive lock for its full duration, so each call is atomic with
//! respect to every other call — mirroring the serialized execution model
//! the vault engine assumes.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::{Address, AssetLedger, LedgerError, PegLedger};

/// Mutable ledger state, guarded as one unit so invariants hold across
/// balance/allowance/supply updates.
struct LedgerState {
    balances: HashMap<Address, u64>,
    /// Allowances keyed by `(owner, spender)`.
    allowances: HashMap<(Address, Address), u64>,
    total_supply: u64,
    authority: Address,
}

/// An in-memory fungible ledger with authority-gated mint and burn.
pub struct MemoryLedger {
    name: String,
    symbol: String,
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    /// Creates an empty ledger with the given mint/burn authority.
    pub fn new(name: &str, symbol: &str, authority: Address) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            state: RwLock::new(LedgerState {
                balances: HashMap::new(),
                allowances: HashMap::new(),
                total_supply: 0,
                authority,
            }),
        }
    }

    /// Creates a ledger pre-funded with `supply` units held by `holder`.
    ///
    /// Use this for reserve assets that exist before the vault does — the
    /// depositor's starting balance in tests and simulations.
    pub fn with_supply(
        name: &str,
        symbol: &str,
        authority: Address,
        holder: &Address,
        supply: u64,
    ) -> Self {
        let ledger = Self::new(name, symbol, authority);
        {
            let mut state = ledger.state.write();
            state.balances.insert(holder.clone(), supply);
            state.total_supply = supply;
        }
        ledger
    }

    /// Human-readable ledger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Grants `spender` an allowance of `amount` over `owner`'s funds.
    ///
    /// Overwrites any previous allowance, exactly like the approval model
    /// of standard fungible-token ledgers.
    pub fn approve(&self, owner: &Address, spender: &Address, amount: u64) {
        let mut state = self.state.write();
        state
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }
}

impl LedgerState {
    fn debit(&mut self, account: &Address, amount: u64) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        if *balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.clone(),
                available: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn credit(&mut self, account: &Address, amount: u64) {
        // Per-account balances are bounded by total_supply, which every
        // mint path checks, so this addition cannot overflow.
        *self.balances.entry(account.clone()).or_insert(0) += amount;
    }

    fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let key = (owner.clone(), spender.clone());
        let granted = self.allowances.get(&key).copied().unwrap_or(0);
        if granted < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
                available: granted,
                requested: amount,
            });
        }
        self.allowances.insert(key, granted - amount);
        Ok(())
    }

    fn require_authority(&self, caller: &Address) -> Result<(), LedgerError> {
        if *caller != self.authority {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}

impl PegLedger for MemoryLedger {
    fn mint(&self, caller: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        state.require_authority(caller)?;
        state.total_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        state.credit(to, amount);
        Ok(())
    }

    fn burn(&self, caller: &Address, from: &Address, amount: u64) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        state.require_authority(caller)?;
        state.debit(from, amount)?;
        state.total_supply -= amount;
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        // Balance before allowance, so an underfunded owner surfaces as
        // InsufficientBalance even when no approval exists either.
        let held = state.balances.get(owner).copied().unwrap_or(0);
        if held < amount {
            return Err(LedgerError::InsufficientBalance {
                account: owner.clone(),
                available: held,
                requested: amount,
            });
        }
        state.spend_allowance(owner, spender, amount)?;
        state.debit(owner, amount)?;
        state.credit(to, amount);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> u64 {
        self.state.read().balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.state
            .read()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self) -> u64 {
        self.state.read().total_supply
    }

    fn transfer_authority(
        &self,
        caller: &Address,
        new_authority: &Address,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        state.require_authority(caller)?;
        state.authority = new_authority.clone();
        Ok(())
    }

    fn authority(&self) -> Address {
        self.state.read().authority.clone()
    }
}

impl AssetLedger for MemoryLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        state.debit(from, amount)?;
        state.credit(to, amount);
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        PegLedger::transfer_from(self, spender, owner, to, amount)
    }

    fn balance_of(&self, account: &Address) -> u64 {
        PegLedger::balance_of(self, account)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        PegLedger::allowance(self, owner, spender)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
