// 6.0 capability.rs: who may broker, govern. injected into the engine.

use crate::types::Principal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Activates proposed swaps.
    Broker,
    /// Cancels swaps, rewires collaborators, pauses the engine.
    Governance,
}

pub trait CapabilityRegistry {
    fn has_capability(&self, principal: Principal, capability: Capability) -> bool;
}

/// In-memory role table.
#[derive(Debug, Default, Clone)]
pub struct RoleRegistry {
    grants: HashMap<Capability, HashSet<Principal>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grant(mut self, principal: Principal, capability: Capability) -> Self {
        self.grant(principal, capability);
        self
    }

    pub fn grant(&mut self, principal: Principal, capability: Capability) {
        self.grants.entry(capability).or_default().insert(principal);
    }

    pub fn revoke(&mut self, principal: Principal, capability: Capability) -> bool {
        self.grants
            .get_mut(&capability)
            .map(|holders| holders.remove(&principal))
            .unwrap_or(false)
    }

    pub fn holders(&self, capability: Capability) -> impl Iterator<Item = &Principal> {
        self.grants.get(&capability).into_iter().flatten()
    }
}

impl CapabilityRegistry for RoleRegistry {
    fn has_capability(&self, principal: Principal, capability: Capability) -> bool {
        self.grants
            .get(&capability)
            .is_some_and(|holders| holders.contains(&principal))
    }
}
