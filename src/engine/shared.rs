// 14.5 engine/shared.rs: thread-safe handle for embedding the engine in a service.
// the lock is held for a whole operation, so two settles of one swap serialize and
// the second sees the first one's status.

use super::core::Engine;
use super::results::EngineError;
use crate::capability::{CapabilityRegistry, RoleRegistry};
use crate::ledger::{FungibleLedger, InMemoryLedger};
use crate::quote::PriceQuote;
use crate::settlement::SettlementResult;
use crate::swap::{Swap, SwapParams};
use crate::types::{Principal, SwapId};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

#[derive(Debug)]
pub struct SharedEngine<C = RoleRegistry, L = InMemoryLedger> {
    inner: Arc<Mutex<Engine<C, L>>>,
}

impl<C, L> Clone for SharedEngine<C, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: CapabilityRegistry, L: FungibleLedger> SharedEngine<C, L> {
    pub fn new(engine: Engine<C, L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Engine<C, L>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine<C, L>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn propose(&self, caller: Principal, params: SwapParams) -> Result<SwapId, EngineError> {
        self.inner.lock().propose(caller, params)
    }

    pub fn activate(&self, caller: Principal, id: SwapId) -> Result<(), EngineError> {
        self.inner.lock().activate(caller, id)
    }

    pub fn cancel(&self, caller: Principal, id: SwapId, reason: Option<String>) -> Result<(), EngineError> {
        self.inner.lock().cancel(caller, id, reason)
    }

    pub fn settle(
        &self,
        caller: Principal,
        id: SwapId,
        quote: &PriceQuote,
        elapsed_days: u32,
        tenor_days: u32,
    ) -> Result<SettlementResult, EngineError> {
        self.inner
            .lock()
            .settle(caller, id, quote, elapsed_days, tenor_days)
    }

    // cloned out; a reference cannot outlive the guard
    pub fn swap(&self, id: SwapId) -> Option<Swap> {
        self.inner.lock().swap(id).cloned()
    }
}
