//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use votegate_core::events::EntryKind;
use votegate_entity::{Admission, HeartbeatStatus, LedgerState, SessionStatus};

/// Generic success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Response payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of a join request.
///
/// Serializes as `{"status":"active","sessionToken":...}` or
/// `{"status":"queued","position":n,"sessionToken":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JoinQueueResponse {
    /// A slot was granted.
    Active {
        /// Token for heartbeats.
        #[serde(rename = "sessionToken")]
        session_token: String,
    },
    /// Waiting in the queue.
    Queued {
        /// Stored queue position.
        position: i64,
        /// Token for heartbeats.
        #[serde(rename = "sessionToken")]
        session_token: String,
    },
}

impl From<Admission> for JoinQueueResponse {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Active { token } => Self::Active {
                session_token: token,
            },
            Admission::Queued { position, token } => Self::Queued {
                position,
                session_token: token,
            },
        }
    }
}

/// Heartbeat acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Current standing of the token.
    #[serde(flatten)]
    pub status: HeartbeatStatus,
    /// Always `true` on success.
    #[serde(rename = "sessionValid")]
    pub session_valid: bool,
}

impl From<HeartbeatStatus> for HeartbeatResponse {
    fn from(status: HeartbeatStatus) -> Self {
        Self {
            status,
            session_valid: true,
        }
    }
}

/// Result of an on-demand promotion cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManageResponse {
    /// `false` when the cycle was cut short by a storage failure.
    pub success: bool,
    /// Number of queue entries promoted.
    pub promoted: u32,
    /// When the cycle ran.
    pub timestamp: DateTime<Utc>,
}

/// Capacity and queue snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Configured capacity.
    pub capacity: u32,
    /// Live sessions holding a slot.
    pub active: u32,
    /// Free slots.
    pub available: u32,
    /// Live queue entries.
    pub queued: u32,
    /// Lowest live queue position.
    pub head_position: Option<i64>,
    /// Highest live queue position.
    pub tail_position: Option<i64>,
    /// When the snapshot was taken.
    pub observed_at: DateTime<Utc>,
}

impl From<LedgerState> for StatusResponse {
    fn from(state: LedgerState) -> Self {
        Self {
            capacity: state.capacity,
            active: state.active,
            available: state.available(),
            queued: state.queued,
            head_position: state.head_position,
            tail_position: state.tail_position,
            observed_at: state.observed_at,
        }
    }
}

/// Acknowledgement of a voluntary leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResponse {
    /// Always `true` on success.
    pub success: bool,
    /// What was released.
    pub released: EntryKind,
}

/// A session after a lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    /// New session status.
    pub status: SessionStatus,
    /// Liveness deadline.
    pub expires_at: DateTime<Utc>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Which store backend is serving admissions.
    pub store: String,
    /// Database status, when a database is configured.
    pub database: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_response_wire_format() {
        let active = JoinQueueResponse::from(Admission::Active { token: "t".into() });
        assert_eq!(
            serde_json::to_value(&active).unwrap(),
            json!({"status": "active", "sessionToken": "t"})
        );

        let queued = JoinQueueResponse::from(Admission::Queued {
            position: 4,
            token: "q".into(),
        });
        assert_eq!(
            serde_json::to_value(&queued).unwrap(),
            json!({"status": "queued", "position": 4, "sessionToken": "q"})
        );
    }

    #[test]
    fn test_heartbeat_response_wire_format() {
        let active = HeartbeatResponse::from(HeartbeatStatus::Active);
        assert_eq!(
            serde_json::to_value(&active).unwrap(),
            json!({"status": "active", "sessionValid": true})
        );

        let queued = HeartbeatResponse::from(HeartbeatStatus::Queued { position: 2 });
        assert_eq!(
            serde_json::to_value(&queued).unwrap(),
            json!({"status": "queued", "position": 2, "sessionValid": true})
        );
    }
}
