// 14.2 engine/lifecycle.rs: propose, activate, cancel.

use super::core::Engine;
use super::results::EngineError;
use crate::capability::{Capability, CapabilityRegistry};
use crate::events::{EventPayload, ProposalCreatedEvent, SwapActivatedEvent, SwapCancelledEvent};
use crate::swap::{SwapParams, SwapStatus};
use crate::types::{Principal, SwapId};
use tracing::info;

impl<C: CapabilityRegistry, L> Engine<C, L> {
    /// Register a new swap in `Proposed`. Anyone may propose; the caller becomes
    /// the proposer and may later withdraw it.
    pub fn propose(&mut self, caller: Principal, params: SwapParams) -> Result<SwapId, EngineError> {
        self.ensure_not_paused()?;
        let now = self.current_time;
        params.validate(now).map_err(EngineError::invalid)?;

        let id = params.derive_id(caller, now);
        let swap = self.registry.create(id, params, caller, now)?;

        let event = ProposalCreatedEvent {
            swap_id: id,
            portfolio_id: swap.portfolio_id,
            proposer: caller,
            buyer: swap.buyer.counterparty,
            seller: swap.seller.counterparty,
            buyer_notional: swap.buyer.notional,
            seller_notional: swap.seller.notional,
            buyer_spread: swap.buyer.spread,
            seller_spread: swap.seller.spread,
            buyer_start: swap.buyer.start,
            buyer_maturity: swap.buyer.maturity,
            seller_start: swap.seller.start,
            seller_maturity: swap.seller.maturity,
            correlation: swap.correlation,
        };
        self.emit_event(EventPayload::ProposalCreated(event));

        info!(swap_id = %id, proposer = %caller, "swap proposed");
        Ok(id)
    }

    /// Broker confirms a proposal. Proposed -> Active.
    pub fn activate(&mut self, caller: Principal, id: SwapId) -> Result<(), EngineError> {
        self.ensure_not_paused()?;
        self.require_capability(caller, Capability::Broker)?;

        let swap = self.registry.get(id).ok_or(EngineError::NotFound(id))?;
        if !swap.status.can_transition_to(SwapStatus::Active) {
            return Err(EngineError::invalid("Swap not in proposed status"));
        }

        self.registry.set_status(id, SwapStatus::Active)?;
        self.emit_event(EventPayload::SwapActivated(SwapActivatedEvent {
            swap_id: id,
            activated_by: caller,
        }));

        info!(swap_id = %id, broker = %caller, "swap activated");
        Ok(())
    }

    // governance: any non-terminal swap. proposer: own swap, only while proposed.
    pub fn cancel(
        &mut self,
        caller: Principal,
        id: SwapId,
        reason: Option<String>,
    ) -> Result<(), EngineError> {
        self.ensure_not_paused()?;

        let swap = self.registry.get(id).ok_or(EngineError::NotFound(id))?;
        let status = swap.status;
        if self.has_capability(caller, Capability::Governance) {
            if !status.can_transition_to(SwapStatus::Cancelled) {
                return Err(EngineError::invalid("Swap already finalized"));
            }
        } else if caller != swap.proposer || status != SwapStatus::Proposed {
            return Err(EngineError::Unauthorized);
        }

        self.registry.set_status(id, SwapStatus::Cancelled)?;
        self.emit_event(EventPayload::SwapCancelled(SwapCancelledEvent {
            swap_id: id,
            cancelled_by: caller,
            reason: reason.clone(),
        }));

        info!(
            swap_id = %id,
            by = %caller,
            from = %status,
            reason = reason.as_deref().unwrap_or(""),
            "swap cancelled"
        );
        Ok(())
    }
}
