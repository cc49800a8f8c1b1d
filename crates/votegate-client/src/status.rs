//! Last-known standing of a client in the queue.

use votegate_entity::{Admission, HeartbeatStatus};

use crate::error::ClientError;

/// What the client currently believes about its place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientStatus {
    /// Not joined yet, or left.
    #[default]
    Idle,
    /// Holding an active session.
    Active {
        /// Session token.
        token: String,
    },
    /// Waiting in the queue.
    Queued {
        /// Stored queue position.
        position: i64,
        /// Queue token; stays the same after promotion.
        token: String,
    },
    /// Polling stopped.
    Error {
        /// Reason shown to the user.
        message: String,
    },
}

impl ClientStatus {
    /// The token being heartbeated, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Active { token } | Self::Queued { token, .. } => Some(token),
            Self::Idle | Self::Error { .. } => None,
        }
    }

    /// Whether the poller should stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Status right after a join call.
    pub fn from_admission(admission: Admission) -> Self {
        match admission {
            Admission::Active { token } => Self::Active { token },
            Admission::Queued { position, token } => Self::Queued { position, token },
        }
    }

    /// Fold one heartbeat result into the status for `token`.
    ///
    /// Any error reply means the session is gone; a request that never
    /// reached the server means the connection is gone.
    pub fn after_heartbeat(token: &str, result: Result<HeartbeatStatus, &ClientError>) -> Self {
        match result {
            Ok(HeartbeatStatus::Active) => Self::Active {
                token: token.to_string(),
            },
            Ok(HeartbeatStatus::Queued { position }) => Self::Queued {
                position,
                token: token.to_string(),
            },
            Err(e) if e.is_transport() => Self::Error {
                message: "Connection lost".to_string(),
            },
            Err(_) => Self::Error {
                message: "Session expired".to_string(),
            },
        }
    }
}
