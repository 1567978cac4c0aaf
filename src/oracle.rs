// 7.0 oracle.rs: price-oracle adapter. the engine only asks it one thing: which
// account's signature is authoritative right now.

use crate::types::Principal;
use std::fmt;

/// Trait for price oracle adapters. Implement this to plug in a signer registry,
/// a rotating key service, or a fixed key.
pub trait PriceOracleAdapter: fmt::Debug + Send + Sync {
    /// On-ledger identity of the adapter itself, reported in change events.
    fn adapter_id(&self) -> Principal;

    /// Account whose quote signatures are accepted.
    fn oracle_signer(&self) -> Principal;
}

/// Adapter with a fixed signer.
#[derive(Debug, Clone)]
pub struct StaticOracleAdapter {
    adapter_id: Principal,
    signer: Principal,
}

impl StaticOracleAdapter {
    pub fn new(adapter_id: Principal, signer: Principal) -> Self {
        Self { adapter_id, signer }
    }

    pub fn set_signer(&mut self, signer: Principal) {
        self.signer = signer;
    }
}

impl PriceOracleAdapter for StaticOracleAdapter {
    fn adapter_id(&self) -> Principal {
        self.adapter_id
    }

    fn oracle_signer(&self) -> Principal {
        self.signer
    }
}
