// 9.0: every state change produces an event. used for audit trails and off-chain
// bookkeeping (accounting mode settles purely through SettlementPaid).

use crate::ledger::AssetId;
use crate::settlement::SettlementMode;
use crate::types::{Amount, Bps, PortfolioId, Principal, SignedAmount, SwapId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }

    /// Swap the event is indexed by, if any.
    pub fn swap_id(&self) -> Option<SwapId> {
        match &self.payload {
            EventPayload::ProposalCreated(e) => Some(e.swap_id),
            EventPayload::SwapActivated(e) => Some(e.swap_id),
            EventPayload::SwapCancelled(e) => Some(e.swap_id),
            EventPayload::SettlementExecuted(e) => Some(e.swap_id),
            EventPayload::SettlementPaid(e) => Some(e.swap_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Lifecycle events
    ProposalCreated(ProposalCreatedEvent),
    SwapActivated(SwapActivatedEvent),
    SwapCancelled(SwapCancelledEvent),

    // Settlement events
    SettlementExecuted(SettlementExecutedEvent),
    SettlementPaid(SettlementPaidEvent),

    // Governance events
    OracleAdapterChanged(OracleAdapterChangedEvent),
    SettlementAssetChanged(SettlementAssetChangedEvent),
    SettlementModeChanged(SettlementModeChangedEvent),
    Paused(PauseEvent),
    Unpaused(PauseEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreatedEvent {
    pub swap_id: SwapId,
    pub portfolio_id: PortfolioId,
    pub proposer: Principal,
    pub buyer: Principal,
    pub seller: Principal,
    pub buyer_notional: Amount,
    pub seller_notional: Amount,
    pub buyer_spread: Bps,
    pub seller_spread: Bps,
    pub buyer_start: Timestamp,
    pub buyer_maturity: Timestamp,
    pub seller_start: Timestamp,
    pub seller_maturity: Timestamp,
    pub correlation: Bps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapActivatedEvent {
    pub swap_id: SwapId,
    pub activated_by: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCancelledEvent {
    pub swap_id: SwapId,
    pub cancelled_by: Principal,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementExecutedEvent {
    pub swap_id: SwapId,
    pub buyer: Principal,
    pub seller: Principal,
    pub pnl: SignedAmount,
    pub settled_at: Timestamp,
    pub elapsed_days: u32,
    pub tenor_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPaidEvent {
    pub swap_id: SwapId,
    pub payer: Principal,
    pub payee: Principal,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleAdapterChangedEvent {
    pub previous: Option<Principal>,
    pub current: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementAssetChangedEvent {
    pub previous: Option<AssetId>,
    pub current: AssetId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementModeChangedEvent {
    pub previous: SettlementMode,
    pub current: SettlementMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseEvent {
    pub by: Principal,
}
