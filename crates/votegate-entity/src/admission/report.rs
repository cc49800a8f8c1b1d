//! Promotion cycle reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of expired rows removed by a reap pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReapSummary {
    /// Expired sessions removed.
    pub sessions: u64,
    /// Expired queue entries removed.
    pub queue_entries: u64,
}

impl ReapSummary {
    /// Whether anything was removed.
    pub fn is_empty(&self) -> bool {
        self.sessions == 0 && self.queue_entries == 0
    }
}

/// Outcome of one promotion cycle. Observability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionReport {
    /// Queue entries promoted into sessions this cycle.
    pub promoted: u32,
    /// Expired sessions reaped at the start of the cycle.
    pub reaped_sessions: u64,
    /// Expired queue entries reaped at the start of the cycle.
    pub reaped_queue_entries: u64,
    /// Whether a storage error cut the cycle short.
    pub aborted: bool,
    /// When the cycle started.
    pub timestamp: DateTime<Utc>,
}
