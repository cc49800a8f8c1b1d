//! Atomic storage operations for sessions and queue entries.
//!
//! Callers never compose reads and writes across these methods; every
//! check-then-mutate sequence lives inside exactly one call so that each
//! call is a single serialised step.

pub mod dispatch;
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use votegate_core::AppResult;
use votegate_core::events::EntryKind;
use votegate_entity::{
    AdmissionOutcome, HeartbeatStatus, LedgerState, QueueEntry, ReapSummary, SessionStatus,
    VotingSession,
};

pub use dispatch::AdmissionStoreDispatch;
pub use memory::MemoryAdmissionStore;
pub use postgres::PostgresAdmissionStore;

/// Input for one atomic admission step.
#[derive(Debug, Clone)]
pub struct AdmitRequest {
    /// Identity being admitted. Already verified.
    pub identity: String,
    /// Token to use if a new session or queue entry is created.
    pub candidate_token: String,
    /// Maximum concurrent sessions.
    pub capacity: u32,
    /// The instant this step runs at.
    pub now: DateTime<Utc>,
    /// Deadline for a newly created row.
    pub expires_at: DateTime<Utc>,
}

/// A queue entry converted into an active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// The new session, carrying the queue entry's token.
    pub session: VotingSession,
    /// The position the entry held while waiting.
    pub position: i64,
}

/// What a voluntary leave removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Identity that left.
    pub identity: String,
    /// Whether a session or a queue entry was removed.
    pub kind: EntryKind,
}

/// Live row a token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenLookup {
    /// The token belongs to a session.
    Session(VotingSession),
    /// The token belongs to a queue entry.
    QueueEntry(QueueEntry),
}

impl TokenLookup {
    /// Identity owning the token.
    pub fn identity(&self) -> &str {
        match self {
            Self::Session(s) => &s.identity,
            Self::QueueEntry(e) => &e.identity,
        }
    }
}

/// Storage for the capacity-bounded session pool and waiting queue.
///
/// Each method runs as one atomic step: capacity and per-identity
/// uniqueness must hold when it returns, whatever else runs concurrently.
/// Dead rows (`expires_at <= now`) are invisible to every method except
/// [`reap_expired`](AdmissionStore::reap_expired).
#[async_trait]
pub trait AdmissionStore: Send + Sync + std::fmt::Debug {
    /// Reuse the identity's live session or queue entry, or create one.
    ///
    /// Fails with `AlreadyVoted` if the identity holds a live completed session.
    async fn admit(&self, request: &AdmitRequest) -> AppResult<AdmissionOutcome>;

    /// Slide a live token's deadline to `expires_at`.
    ///
    /// Returns `None` for unknown, expired, or completed tokens.
    async fn heartbeat(
        &self,
        token: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<HeartbeatStatus>>;

    /// Delete every session and queue entry whose deadline has passed.
    async fn reap_expired(&self, now: DateTime<Utc>) -> AppResult<ReapSummary>;

    /// Convert the head of the queue into an active session if a slot is free.
    ///
    /// Returns `None` when the pool is full or nobody is waiting.
    async fn promote_next(
        &self,
        capacity: u32,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Promotion>>;

    /// Snapshot capacity and queue occupancy.
    async fn ledger_state(&self, capacity: u32, now: DateTime<Utc>) -> AppResult<LedgerState>;

    /// Move a live session to `to` if it is currently in one of `from`.
    ///
    /// Refreshes the session's liveness. Returns `None` for unknown or
    /// expired tokens and a validation error for a disallowed transition.
    async fn set_session_status(
        &self,
        token: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<VotingSession>>;

    /// Remove the live session or queue entry behind `token`.
    async fn release(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Release>>;

    /// Resolve a token to its live row.
    async fn find_by_token(&self, token: &str, now: DateTime<Utc>)
    -> AppResult<Option<TokenLookup>>;
}

/// Error for a status change the session's current state does not allow.
pub(crate) fn transition_error(
    current: SessionStatus,
    to: SessionStatus,
) -> votegate_core::AppError {
    votegate_core::AppError::validation(format!("Cannot move a {current} session to {to}"))
}
