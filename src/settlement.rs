// 10.0 settlement.rs: turns a signed pnl into a value movement.
// accounting mode only records it (SettlementPaid event for off-chain books),
// transfers mode pulls it through the ledger from payer to payee.

use crate::events::SettlementPaidEvent;
use crate::ledger::{AssetId, FungibleLedger, LedgerError};
use crate::types::{Amount, Principal, SignedAmount, SwapId, Timestamp};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    #[default]
    Accounting,
    Transfers,
}

impl fmt::Display for SettlementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementMode::Accounting => f.write_str("accounting"),
            SettlementMode::Transfers => f.write_str("transfers"),
        }
    }
}

// 10.1: who pays whom. amount is always the pnl magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub payer: Principal,
    pub payee: Principal,
    pub amount: Amount,
}

impl Transfer {
    /// Positive pnl: seller pays buyer. Negative: buyer pays seller.
    pub fn from_pnl(pnl: SignedAmount, buyer: Principal, seller: Principal) -> Self {
        let amount = pnl.unsigned_abs();
        if pnl.is_negative() {
            Self { payer: buyer, payee: seller, amount }
        } else {
            Self { payer: seller, payee: buyer, amount }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == U256::ZERO
    }
}

/// Outcome of a settle call. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub swap_id: SwapId,
    pub pnl: SignedAmount,
    pub payer: Principal,
    pub payee: Principal,
    pub amount: Amount,
    pub elapsed_days: u32,
    pub tenor_days: u32,
    pub settled_at: Timestamp,
    pub mode: SettlementMode,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("Settlement asset not set")]
    AssetNotSet,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementAdapter {
    asset: Option<AssetId>,
    mode: SettlementMode,
}

impl SettlementAdapter {
    pub fn new(asset: Option<AssetId>, mode: SettlementMode) -> Self {
        Self { asset, mode }
    }

    pub fn asset(&self) -> Option<AssetId> {
        self.asset
    }

    pub fn mode(&self) -> SettlementMode {
        self.mode
    }

    pub fn set_asset(&mut self, asset: AssetId) -> Option<AssetId> {
        self.asset.replace(asset)
    }

    pub fn set_mode(&mut self, mode: SettlementMode) -> SettlementMode {
        std::mem::replace(&mut self.mode, mode)
    }

    /// Realize or record `transfer`. Zero amounts are a no-op with no event.
    /// `spender` is the engine's own identity, which payers pre-approve.
    pub fn execute<L: FungibleLedger>(
        &self,
        ledger: &mut L,
        spender: Principal,
        swap_id: SwapId,
        transfer: &Transfer,
    ) -> Result<Option<SettlementPaidEvent>, SettlementError> {
        if transfer.is_zero() {
            return Ok(None);
        }

        if self.mode == SettlementMode::Transfers {
            let asset = self.asset.ok_or(SettlementError::AssetNotSet)?;
            ledger.transfer_from(asset, spender, transfer.payer, transfer.payee, transfer.amount)?;
        }

        Ok(Some(SettlementPaidEvent {
            swap_id,
            payer: transfer.payer,
            payee: transfer.payee,
            amount: transfer.amount,
        }))
    }
}
