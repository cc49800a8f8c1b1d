//! Read-only view of capacity usage.

use std::sync::Arc;

use votegate_core::{AppResult, Clock};
use votegate_entity::LedgerState;

use crate::store::AdmissionStore;

/// Counts live slot holders and waiting entries.
///
/// Snapshots are for reporting only. Decisions that depend on the count are
/// made inside the store, in the same step as the write they guard.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    store: Arc<dyn AdmissionStore>,
    clock: Arc<dyn Clock>,
    capacity: u32,
}

impl CapacityLedger {
    /// Create a ledger for a pool of `capacity` slots.
    pub fn new(store: Arc<dyn AdmissionStore>, clock: Arc<dyn Clock>, capacity: u32) -> Self {
        Self {
            store,
            clock,
            capacity,
        }
    }

    /// Current occupancy snapshot.
    pub async fn state(&self) -> AppResult<LedgerState> {
        self.store.ledger_state(self.capacity, self.clock.now()).await
    }

    /// Live sessions with status active or voting.
    pub async fn active_count(&self) -> AppResult<u32> {
        Ok(self.state().await?.active)
    }

    /// Configured capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
