// 5.0 ledger.rs: the fungible-asset ledger the engine settles against.
// erc-20 shaped: balances per (asset, holder), allowances per (asset, owner, spender),
// pull transfers by an approved spender. InMemoryLedger backs tests and the simulator.

use crate::types::{Amount, Principal};
use alloy_primitives::{Address, U256};
use std::collections::HashMap;

/// Token contract address of a settlement asset.
pub type AssetId = Address;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient balance for {holder}: required {required}, available {available}")]
    InsufficientBalance {
        holder: Principal,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance from {owner} to {spender}: required {required}, approved {approved}")]
    InsufficientAllowance {
        owner: Principal,
        spender: Principal,
        required: Amount,
        approved: Amount,
    },

    #[error("Balance overflow for {holder}")]
    Overflow { holder: Principal },
}

pub trait FungibleLedger {
    fn balance_of(&self, asset: AssetId, holder: Principal) -> Amount;

    fn allowance(&self, asset: AssetId, owner: Principal, spender: Principal) -> Amount;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    /// Either the whole movement applies or nothing does.
    fn transfer_from(
        &mut self,
        asset: AssetId,
        spender: Principal,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    fn backend_type(&self) -> &str;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    balances: HashMap<(AssetId, Principal), Amount>,
    allowances: HashMap<(AssetId, Principal, Principal), Amount>,
    transfers: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, asset: AssetId, holder: Principal, amount: Amount) {
        let entry = self.balances.entry((asset, holder)).or_insert(U256::ZERO);
        *entry = entry.saturating_add(amount);
    }

    pub fn approve(&mut self, asset: AssetId, owner: Principal, spender: Principal, amount: Amount) {
        self.allowances.insert((asset, owner, spender), amount);
    }

    pub fn total_supply(&self, asset: AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .fold(U256::ZERO, |acc, (_, bal)| acc.saturating_add(*bal))
    }

    pub fn transfer_count(&self) -> u64 {
        self.transfers
    }
}

impl FungibleLedger for InMemoryLedger {
    fn balance_of(&self, asset: AssetId, holder: Principal) -> Amount {
        self.balances.get(&(asset, holder)).copied().unwrap_or(U256::ZERO)
    }

    fn allowance(&self, asset: AssetId, owner: Principal, spender: Principal) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn transfer_from(
        &mut self,
        asset: AssetId,
        spender: Principal,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        // validate everything before touching state
        let approved = self.allowance(asset, from, spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                required: amount,
                approved,
            });
        }
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                holder: from,
                required: amount,
                available,
            });
        }
        if from != to {
            let to_balance = self.balance_of(asset, to);
            let credited = to_balance
                .checked_add(amount)
                .ok_or(LedgerError::Overflow { holder: to })?;
            self.balances.insert((asset, from), available - amount);
            self.balances.insert((asset, to), credited);
        }
        self.allowances.insert((asset, from, spender), approved - amount);
        self.transfers += 1;
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "in_memory"
    }
}
