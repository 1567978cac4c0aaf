// 8.0 registry.rs: durable swap store keyed by derived id.
// storage only: transition rules live in the engine.

use crate::swap::{Swap, SwapParams, SwapStatus};
use crate::types::{Principal, SwapId, Timestamp};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Swap {0} already exists")]
    AlreadyExists(SwapId),

    #[error("Swap {0} not found")]
    NotFound(SwapId),
}

#[derive(Debug, Default, Clone)]
pub struct SwapRegistry {
    swaps: HashMap<SwapId, Swap>,
}

impl SwapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        id: SwapId,
        params: SwapParams,
        proposer: Principal,
        created_at: Timestamp,
    ) -> Result<&Swap, RegistryError> {
        if self.swaps.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        let swap = Swap::new(id, params, proposer, created_at);
        Ok(self.swaps.entry(id).or_insert(swap))
    }

    pub fn get(&self, id: SwapId) -> Option<&Swap> {
        self.swaps.get(&id)
    }

    pub fn exists(&self, id: SwapId) -> bool {
        self.swaps.contains_key(&id)
    }

    /// Returns the previous status.
    pub fn set_status(&mut self, id: SwapId, status: SwapStatus) -> Result<SwapStatus, RegistryError> {
        let swap = self.swaps.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        Ok(std::mem::replace(&mut swap.status, status))
    }

    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Swap> {
        self.swaps.values()
    }

    pub fn ids_with_status(&self, status: SwapStatus) -> Vec<SwapId> {
        let mut ids: Vec<SwapId> = self
            .swaps
            .values()
            .filter(|s| s.status == status)
            .map(|s| s.id)
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::Leg;
    use crate::types::Bps;
    use alloy_primitives::{address, B256, U256};

    fn params() -> SwapParams {
        let leg = Leg::new(
            address!("00000000000000000000000000000000000000b1"),
            U256::from(1_000u64),
            Bps(80),
            Timestamp(2_000),
            Timestamp(3_000),
        );
        SwapParams {
            portfolio_id: B256::repeat_byte(0x11),
            buyer: leg.clone(),
            seller: leg,
            correlation: Bps(5_000),
        }
    }

    #[test]
    fn create_get_exists() {
        let mut registry = SwapRegistry::new();
        let id = SwapId(B256::repeat_byte(1));
        let proposer = address!("00000000000000000000000000000000000000f1");

        assert!(!registry.exists(id));
        let swap = registry.create(id, params(), proposer, Timestamp(1_000)).unwrap();
        assert_eq!(swap.status, SwapStatus::Proposed);
        assert_eq!(swap.proposer, proposer);

        assert!(registry.exists(id));
        assert_eq!(registry.get(id).unwrap().created_at, Timestamp(1_000));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_create_fails() {
        let mut registry = SwapRegistry::new();
        let id = SwapId(B256::repeat_byte(1));
        registry.create(id, params(), Principal::ZERO, Timestamp(1)).unwrap();
        let err = registry.create(id, params(), Principal::ZERO, Timestamp(2)).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyExists(id));
        assert_eq!(registry.get(id).unwrap().created_at, Timestamp(1));
    }

    #[test]
    fn set_status_does_not_validate_transitions() {
        let mut registry = SwapRegistry::new();
        let id = SwapId(B256::repeat_byte(1));
        registry.create(id, params(), Principal::ZERO, Timestamp(1)).unwrap();

        let prev = registry.set_status(id, SwapStatus::Settled).unwrap();
        assert_eq!(prev, SwapStatus::Proposed);
        let prev = registry.set_status(id, SwapStatus::Proposed).unwrap();
        assert_eq!(prev, SwapStatus::Settled);

        assert_eq!(registry.ids_with_status(SwapStatus::Proposed), vec![id]);
    }

    #[test]
    fn set_status_missing_fails() {
        let mut registry = SwapRegistry::new();
        let id = SwapId(B256::repeat_byte(9));
        assert_eq!(
            registry.set_status(id, SwapStatus::Active),
            Err(RegistryError::NotFound(id))
        );
    }
}
