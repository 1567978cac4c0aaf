// 12.0 config.rs: engine settings in one place. protocol constants (staleness window,
// bps bounds, max tenor) are fixed in quote.rs / pnl.rs and deliberately not here.

use crate::ledger::AssetId;
use crate::settlement::SettlementMode;
use crate::types::Principal;
use alloy_primitives::address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default on-ledger identity of the engine, the spender payers approve.
pub const DEFAULT_ENGINE_ADDRESS: Principal = address!("00000000000000000000000000000000000c0de5");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Maximum number of events to retain in memory. Once reached, the oldest events
    // are dropped. Ids are never reused, so the first retained id tells how many went.
    pub max_events: usize,
    // Identity the engine uses as spender in transfers mode
    pub engine_address: Principal,
    // Mode the engine starts in; governance can switch it later
    pub settlement_mode: SettlementMode,
    // Asset settled in transfers mode
    pub settlement_asset: Option<AssetId>,
    // Log every emitted event at debug level
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            engine_address: DEFAULT_ENGINE_ADDRESS,
            settlement_mode: SettlementMode::Accounting,
            settlement_asset: None,
            verbose: false,
        }
    }
}

impl EngineConfig {
    // Record-only settlement, books reconciled off-chain
    pub fn accounting() -> Self {
        Self::default()
    }

    // Live value movement in `asset`
    pub fn transfers(asset: AssetId) -> Self {
        Self {
            settlement_mode: SettlementMode::Transfers,
            settlement_asset: Some(asset),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_events == 0 {
            return Err(ConfigError::Invalid("max_events must be positive"));
        }
        if self.engine_address == Principal::ZERO {
            return Err(ConfigError::Invalid("engine_address must be non-zero"));
        }
        if self.settlement_mode == SettlementMode::Transfers && self.settlement_asset.is_none() {
            return Err(ConfigError::Invalid("transfers mode needs a settlement_asset"));
        }
        Ok(())
    }
}
