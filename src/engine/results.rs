// 14.0.2: engine errors. four caller-facing kinds plus the two ways the outside world
// can refuse a settlement that already passed validation.

use crate::ledger::LedgerError;
use crate::pnl::PnlError;
use crate::registry::RegistryError;
use crate::settlement::SettlementError;
use crate::types::SwapId;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Swap {0} not found")]
    NotFound(SwapId),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Engine is paused")]
    Paused,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("PnL error: {0}")]
    Pnl(PnlError),
}

impl EngineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidParams(reason.into())
    }
}

impl From<PnlError> for EngineError {
    fn from(err: PnlError) -> Self {
        match err {
            PnlError::InvalidDays { .. } => EngineError::invalid(err.to_string()),
            PnlError::Overflow => EngineError::Pnl(err),
        }
    }
}

impl From<SettlementError> for EngineError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::AssetNotSet => EngineError::invalid(err.to_string()),
            SettlementError::Ledger(e) => EngineError::Ledger(e),
        }
    }
}

impl From<RegistryError> for EngineError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => EngineError::NotFound(id),
            RegistryError::AlreadyExists(_) => EngineError::invalid("Swap already exists"),
        }
    }
}
