//! Admission engine configuration.

use serde::{Deserialize, Serialize};

/// Longest liveness window accepted by validation, one day.
pub const MAX_SESSION_TTL_SECONDS: u64 = 86_400;

/// Settings for capacity accounting, liveness, and promotion batching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Maximum number of concurrent active/voting sessions (C).
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Liveness window in seconds; every heartbeat slides expiry this far ahead.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Maximum promotions performed in a single promotion cycle.
    #[serde(default = "default_batch_limit")]
    pub promotion_batch_limit: u32,
    /// Recommended client heartbeat cadence in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// How many times an admission is re-attempted after a capacity race.
    #[serde(default = "default_max_race_retries")]
    pub max_race_retries: u32,
    /// Which backend holds sessions and queue entries.
    #[serde(default)]
    pub store: StoreBackend,
}

impl AdmissionConfig {
    /// The liveness window as a chrono duration.
    ///
    /// Clamped to [`MAX_SESSION_TTL_SECONDS`] so an unvalidated value can
    /// never produce a negative or out-of-range window.
    pub fn session_ttl(&self) -> chrono::Duration {
        let seconds = self.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);
        chrono::Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX))
    }

    /// The client heartbeat cadence as a std duration.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_seconds)
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            session_ttl_seconds: default_session_ttl(),
            promotion_batch_limit: default_batch_limit(),
            poll_interval_seconds: default_poll_interval(),
            max_race_retries: default_max_race_retries(),
            store: StoreBackend::default(),
        }
    }
}

/// Storage backend for sessions and queue entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Single-process, mutex-guarded in-memory tables.
    Memory,
    /// PostgreSQL tables guarded by a transaction-scoped advisory lock.
    Postgres,
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Postgres
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Postgres => write!(f, "postgres"),
        }
    }
}

fn default_capacity() -> u32 {
    100
}

fn default_session_ttl() -> u64 {
    300
}

fn default_batch_limit() -> u32 {
    10
}

fn default_poll_interval() -> u64 {
    30
}

fn default_max_race_retries() -> u32 {
    3
}
