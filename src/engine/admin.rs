// 14.4 engine/admin.rs: governance setters and the pause switch.

use super::core::Engine;
use super::results::EngineError;
use crate::capability::{Capability, CapabilityRegistry};
use crate::events::{
    EventPayload, OracleAdapterChangedEvent, PauseEvent, SettlementAssetChangedEvent,
    SettlementModeChangedEvent,
};
use crate::ledger::AssetId;
use crate::oracle::PriceOracleAdapter;
use crate::settlement::SettlementMode;
use crate::types::Principal;
use std::sync::Arc;
use tracing::{info, warn};

impl<C: CapabilityRegistry, L> Engine<C, L> {
    fn ensure_governor(&self, caller: Principal) -> Result<(), EngineError> {
        self.ensure_not_paused()?;
        self.require_capability(caller, Capability::Governance)
    }

    pub fn set_price_oracle_adapter(
        &mut self,
        caller: Principal,
        adapter: Arc<dyn PriceOracleAdapter>,
    ) -> Result<(), EngineError> {
        self.ensure_governor(caller)?;
        let current = adapter.adapter_id();
        if current == Principal::ZERO {
            return Err(EngineError::invalid("Invalid oracle adapter"));
        }

        let previous = self.oracle.replace(adapter).map(|o| o.adapter_id());
        self.emit_event(EventPayload::OracleAdapterChanged(OracleAdapterChangedEvent {
            previous,
            current,
        }));

        info!(adapter = %current, signer = ?self.oracle_signer(), "oracle adapter set");
        Ok(())
    }

    pub fn set_settlement_asset(&mut self, caller: Principal, asset: AssetId) -> Result<(), EngineError> {
        self.ensure_governor(caller)?;
        if asset == AssetId::ZERO {
            return Err(EngineError::invalid("Invalid settlement asset"));
        }

        let previous = self.settlement.set_asset(asset);
        self.emit_event(EventPayload::SettlementAssetChanged(SettlementAssetChangedEvent {
            previous,
            current: asset,
        }));

        info!(asset = %asset, "settlement asset set");
        Ok(())
    }

    pub fn set_settlement_mode(
        &mut self,
        caller: Principal,
        mode: SettlementMode,
    ) -> Result<(), EngineError> {
        self.ensure_governor(caller)?;

        let previous = self.settlement.set_mode(mode);
        self.emit_event(EventPayload::SettlementModeChanged(SettlementModeChangedEvent {
            previous,
            current: mode,
        }));

        if mode == SettlementMode::Transfers && self.settlement.asset().is_none() {
            // settlements with non-zero pnl will fail until an asset is configured
            warn!("transfers mode enabled without a settlement asset");
        }
        info!(from = %previous, to = %mode, "settlement mode set");
        Ok(())
    }

    pub fn pause(&mut self, caller: Principal) -> Result<(), EngineError> {
        self.ensure_governor(caller)?;
        self.paused = true;
        self.emit_event(EventPayload::Paused(PauseEvent { by: caller }));
        warn!(by = %caller, "engine paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: Principal) -> Result<(), EngineError> {
        self.require_capability(caller, Capability::Governance)?;
        if !self.paused {
            return Err(EngineError::invalid("Engine not paused"));
        }
        self.paused = false;
        self.emit_event(EventPayload::Unpaused(PauseEvent { by: caller }));
        info!(by = %caller, "engine unpaused");
        Ok(())
    }
}
