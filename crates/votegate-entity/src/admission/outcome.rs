//! Admission and heartbeat results.

use serde::{Deserialize, Serialize};

/// What a requester holds after admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Admission {
    /// The requester holds an active session.
    Active {
        /// Session token.
        token: String,
    },
    /// The requester is waiting in line.
    Queued {
        /// Queue position.
        position: i64,
        /// Queue token; stays valid after promotion.
        token: String,
    },
}

impl Admission {
    /// The token the client heartbeats with.
    pub fn token(&self) -> &str {
        match self {
            Self::Active { token } | Self::Queued { token, .. } => token,
        }
    }

    /// The queue position, if waiting.
    pub fn position(&self) -> Option<i64> {
        match self {
            Self::Active { .. } => None,
            Self::Queued { position, .. } => Some(*position),
        }
    }
}

/// Which branch of the admission procedure produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPath {
    /// A live session already existed for the identity.
    ExistingSession,
    /// A live queue entry already existed for the identity.
    ExistingQueueEntry,
    /// A new session was created.
    Admitted,
    /// A new queue entry was created.
    Enqueued,
}

impl AdmissionPath {
    /// Whether the call re-used state created by an earlier call.
    pub fn is_reentry(&self) -> bool {
        matches!(self, Self::ExistingSession | Self::ExistingQueueEntry)
    }
}

/// Result of one atomic admission step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionOutcome {
    /// What the requester now holds.
    pub admission: Admission,
    /// How it was obtained.
    pub path: AdmissionPath,
}

/// Liveness status reported back to a heartbeating client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HeartbeatStatus {
    /// The token belongs to a live session.
    Active,
    /// The token belongs to a live queue entry.
    Queued {
        /// Current queue position.
        position: i64,
    },
}
