// 2.0 swap.rs: legs, proposal terms, the stored swap record and its status machine.

use crate::types::{Amount, Bps, PortfolioId, Principal, SwapId, Timestamp};
use alloy_primitives::{keccak256, Address};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub counterparty: Principal,
    pub notional: Amount,
    pub spread: Bps,
    pub start: Timestamp,
    pub maturity: Timestamp,
}

impl Leg {
    pub fn new(
        counterparty: Principal,
        notional: Amount,
        spread: Bps,
        start: Timestamp,
        maturity: Timestamp,
    ) -> Self {
        Self {
            counterparty,
            notional,
            spread,
            start,
            maturity,
        }
    }

    // reason string on failure; the engine wraps it in InvalidParams
    pub(crate) fn validate(&self, now: Timestamp) -> Result<(), &'static str> {
        if self.counterparty == Address::ZERO {
            return Err("Invalid counterparty");
        }
        if self.notional.is_zero() {
            return Err("Notional must be positive");
        }
        if self.spread > Bps::MAX {
            return Err("Spread out of range");
        }
        if self.start >= self.maturity {
            return Err("Start must precede maturity");
        }
        if self.start <= now {
            return Err("Start must be in the future");
        }
        Ok(())
    }

    fn abi_fields(&self) -> (Address, Amount, u16, u64, u64) {
        (
            self.counterparty,
            self.notional,
            self.spread.value(),
            self.start.as_secs(),
            self.maturity.as_secs(),
        )
    }
}

/// Economic terms submitted with `propose`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub portfolio_id: PortfolioId,
    pub buyer: Leg,
    pub seller: Leg,
    pub correlation: Bps,
}

impl SwapParams {
    pub(crate) fn validate(&self, now: Timestamp) -> Result<(), &'static str> {
        if self.portfolio_id.is_zero() {
            return Err("Invalid portfolio id");
        }
        if self.correlation > Bps::MAX {
            return Err("Correlation out of range");
        }
        self.buyer.validate(now)?;
        self.seller.validate(now)?;
        Ok(())
    }

    /// keccak256(abi.encode(terms, proposer, now)). the same proposer submitting
    /// identical terms twice within one second derives the same id.
    pub fn derive_id(&self, proposer: Principal, now: Timestamp) -> SwapId {
        let encoded = (
            self.portfolio_id,
            self.buyer.abi_fields(),
            self.seller.abi_fields(),
            self.correlation.value(),
            proposer,
            now.as_secs(),
        )
            .abi_encode();
        SwapId(keccak256(encoded))
    }
}

// 2.1: Proposed -> Active -> Settled, Proposed -> Cancelled.
// governance may also unwind a live swap (Active -> Cancelled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStatus {
    Proposed,
    Active,
    Cancelled,
    Settled,
}

impl SwapStatus {
    pub fn can_transition_to(&self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (SwapStatus::Proposed, SwapStatus::Active)
                | (SwapStatus::Proposed, SwapStatus::Cancelled)
                | (SwapStatus::Active, SwapStatus::Settled)
                | (SwapStatus::Active, SwapStatus::Cancelled)
        )
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwapStatus::Proposed => "proposed",
            SwapStatus::Active => "active",
            SwapStatus::Cancelled => "cancelled",
            SwapStatus::Settled => "settled",
        };
        f.write_str(s)
    }
}

/// A swap as held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    pub id: SwapId,
    pub portfolio_id: PortfolioId,
    pub buyer: Leg,
    pub seller: Leg,
    pub correlation: Bps,
    pub status: SwapStatus,
    pub proposer: Principal,
    pub created_at: Timestamp,
}

impl Swap {
    pub fn new(id: SwapId, params: SwapParams, proposer: Principal, created_at: Timestamp) -> Self {
        Self {
            id,
            portfolio_id: params.portfolio_id,
            buyer: params.buyer,
            seller: params.seller,
            correlation: params.correlation,
            status: SwapStatus::Proposed,
            proposer,
            created_at,
        }
    }

    pub fn is_proposed(&self) -> bool {
        self.status == SwapStatus::Proposed
    }

    pub fn is_active(&self) -> bool {
        self.status == SwapStatus::Active
    }
}
