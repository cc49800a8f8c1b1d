//! Queue entry entity model.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A waiting requester's reserved place in line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QueueEntry {
    /// Row identifier.
    pub id: Uuid,
    /// The waiting identity.
    #[sqlx(rename = "student_registration_number")]
    pub identity: String,
    /// Arrival position. Strictly increasing, never reused, may have gaps.
    pub queue_position: i64,
    /// Token the client heartbeats with; carried over on promotion.
    pub session_token: String,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Last heartbeat received.
    pub last_heartbeat: DateTime<Utc>,
    /// Liveness deadline.
    pub expires_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Whether the entry is still alive at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Total FIFO order: position, then creation time, then identity.
    pub fn fifo_cmp(&self, other: &Self) -> Ordering {
        self.queue_position
            .cmp(&other.queue_position)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.identity.cmp(&other.identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(identity: &str, position: i64, created_at: DateTime<Utc>) -> QueueEntry {
        QueueEntry {
            id: Uuid::new_v4(),
            identity: identity.to_string(),
            queue_position: position,
            session_token: format!("tok-{identity}"),
            created_at,
            last_heartbeat: created_at,
            expires_at: created_at + Duration::minutes(5),
        }
    }

    #[test]
    fn test_fifo_prefers_lower_position() {
        let now = Utc::now();
        let early = entry("b", 1, now);
        let late = entry("a", 2, now - Duration::seconds(10));
        assert_eq!(early.fifo_cmp(&late), Ordering::Less);
    }

    #[test]
    fn test_fifo_ties_broken_by_creation_then_identity() {
        let now = Utc::now();
        let first = entry("z", 4, now - Duration::seconds(1));
        let second = entry("a", 4, now);
        assert_eq!(first.fifo_cmp(&second), Ordering::Less);

        let x = entry("x", 4, now);
        let y = entry("y", 4, now);
        assert_eq!(x.fifo_cmp(&y), Ordering::Less);
    }

    #[test]
    fn test_expiry_boundary_is_dead() {
        let now = Utc::now();
        let mut e = entry("a", 1, now);
        e.expires_at = now;
        assert!(!e.is_live(now));
    }
}
