//! Capacity ledger snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of capacity and queue occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Configured maximum concurrent sessions.
    pub capacity: u32,
    /// Live sessions with status active or voting.
    pub active: u32,
    /// Live queue entries.
    pub queued: u32,
    /// Smallest live queue position, i.e. the next to be promoted.
    pub head_position: Option<i64>,
    /// Largest live queue position.
    pub tail_position: Option<i64>,
    /// When the snapshot was taken.
    pub observed_at: DateTime<Utc>,
}

impl LedgerState {
    /// Slots currently free.
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.active)
    }

    /// Whether a new session could be admitted right now.
    pub fn has_free_slot(&self) -> bool {
        self.active < self.capacity
    }
}
