//! Voting session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::SessionStatus;

/// A grant of active access to the ballot.
///
/// At most one session per identity may hold a slot at a time. A session
/// is logically dead as soon as `expires_at` is not in the future, even
/// before the reaper removes the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VotingSession {
    /// Row identifier.
    pub id: Uuid,
    /// The identity (registration number) holding this session.
    #[sqlx(rename = "student_registration_number")]
    pub identity: String,
    /// Opaque token the client heartbeats with.
    pub session_token: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// When the session (or the queue entry it was promoted from) was created.
    pub created_at: DateTime<Utc>,
    /// Last heartbeat received.
    pub last_heartbeat: DateTime<Utc>,
    /// Liveness deadline.
    pub expires_at: DateTime<Utc>,
}

impl VotingSession {
    /// Whether the session is still alive at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether the session counts against capacity at `now`.
    pub fn holds_slot(&self, now: DateTime<Utc>) -> bool {
        self.status.occupies_slot() && self.is_live(now)
    }
}
