//! Queue and session lifecycle events.

use serde::{Deserialize, Serialize};

/// Which table an identity's live entry lived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// An active or voting session.
    Session,
    /// A waiting queue entry.
    QueueEntry,
}

/// Events related to admission, promotion, and release of voting slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// A requester was admitted straight into an active session.
    SessionCreated {
        /// The admitted identity.
        identity: String,
    },
    /// A requester was placed in the waiting queue.
    Enqueued {
        /// The queued identity.
        identity: String,
        /// Assigned queue position.
        position: i64,
    },
    /// A queue entry was converted into an active session.
    Promoted {
        /// The promoted identity.
        identity: String,
        /// The position it held while waiting.
        position: i64,
    },
    /// A client left voluntarily.
    Released {
        /// The identity that left.
        identity: String,
        /// What it was holding.
        kind: EntryKind,
    },
    /// A session finished voting.
    Completed {
        /// The identity that completed.
        identity: String,
    },
    /// Expired entries were removed.
    Reaped {
        /// Number of expired sessions removed.
        sessions: u64,
        /// Number of expired queue entries removed.
        queue_entries: u64,
    },
}

impl QueueEvent {
    /// Whether this event frees capacity that a waiting entry could take.
    pub fn releases_slot(&self) -> bool {
        match self {
            Self::Released { kind, .. } => *kind == EntryKind::Session,
            Self::Completed { .. } => true,
            Self::Reaped { sessions, .. } => *sessions > 0,
            Self::SessionCreated { .. } | Self::Enqueued { .. } | Self::Promoted { .. } => false,
        }
    }
}
