// 14.1 engine/core.rs: engine state, clock, read accessors and the shared guards
// (pause, capability) every mutating operation goes through.

use super::results::EngineError;
use crate::capability::{Capability, CapabilityRegistry, RoleRegistry};
use crate::config::EngineConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::ledger::{AssetId, InMemoryLedger};
use crate::oracle::PriceOracleAdapter;
use crate::quote::QuoteAuthenticator;
use crate::registry::SwapRegistry;
use crate::settlement::{SettlementAdapter, SettlementMode};
use crate::swap::Swap;
use crate::types::{Principal, SwapId, Timestamp};
use std::sync::Arc;
use tracing::debug;

/** 14.1.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine<C = RoleRegistry, L = InMemoryLedger> {
    pub(super) config: EngineConfig,
    pub(super) registry: SwapRegistry,
    pub(super) capabilities: C,
    pub(super) ledger: L,
    pub(super) oracle: Option<Arc<dyn PriceOracleAdapter>>,
    pub(super) authenticator: QuoteAuthenticator,
    pub(super) settlement: SettlementAdapter,
    pub(super) paused: bool,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl<C: CapabilityRegistry, L> Engine<C, L> {
    pub fn new(config: EngineConfig, capabilities: C, ledger: L) -> Self {
        let settlement = SettlementAdapter::new(config.settlement_asset, config.settlement_mode);
        Self {
            config,
            registry: SwapRegistry::new(),
            capabilities,
            ledger,
            oracle: None,
            authenticator: QuoteAuthenticator::new(),
            settlement,
            paused: false,
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_secs(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.current_time = self.current_time.plus_secs(secs);
    }

    pub fn advance_days(&mut self, days: u64) {
        self.current_time = self.current_time.plus_days(days);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn swap(&self, id: SwapId) -> Option<&Swap> {
        self.registry.get(id)
    }

    pub fn swaps(&self) -> impl Iterator<Item = &Swap> {
        self.registry.iter()
    }

    pub fn registry(&self) -> &SwapRegistry {
        &self.registry
    }

    pub fn capabilities(&self) -> &C {
        &self.capabilities
    }

    // grants/revocations happen outside the engine, like on the access-control contract
    pub fn capabilities_mut(&mut self) -> &mut C {
        &mut self.capabilities
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn settlement_mode(&self) -> SettlementMode {
        self.settlement.mode()
    }

    pub fn settlement_asset(&self) -> Option<AssetId> {
        self.settlement.asset()
    }

    /// Signer the current oracle adapter vouches for, if one is installed.
    pub fn oracle_signer(&self) -> Option<Principal> {
        self.oracle.as_ref().map(|o| o.oracle_signer())
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn ensure_not_paused(&self) -> Result<(), EngineError> {
        if self.paused {
            return Err(EngineError::Paused);
        }
        Ok(())
    }

    pub(super) fn has_capability(&self, caller: Principal, capability: Capability) -> bool {
        self.capabilities.has_capability(caller, capability)
    }

    pub(super) fn require_capability(
        &self,
        caller: Principal,
        capability: Capability,
    ) -> Result<(), EngineError> {
        if !self.has_capability(caller, capability) {
            return Err(EngineError::Unauthorized);
        }
        Ok(())
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            debug!(event_id = event.id.0, payload = ?event.payload, "event");
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), RoleRegistry::new(), InMemoryLedger::new())
    }
}
