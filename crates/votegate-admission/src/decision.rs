//! Admission and promotion rules as pure functions.
//!
//! Stores gather a consistent snapshot inside their critical section, ask
//! these functions what to do, and apply the answer before releasing it.
//! Keeping the rules here means the memory and PostgreSQL backends cannot
//! drift apart.

use chrono::{DateTime, Utc};
use votegate_entity::{QueueEntry, SessionStatus, VotingSession};

/// Snapshot of everything an admission decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionView<'a> {
    /// Session row for the identity, live or not.
    pub session: Option<&'a VotingSession>,
    /// Queue row for the identity, live or not.
    pub queue_entry: Option<&'a QueueEntry>,
    /// Live sessions currently holding a slot.
    pub active_count: u32,
    /// Largest queue position among all remaining rows.
    pub max_position: Option<i64>,
}

/// What the store must do for this admission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Hand back the identity's live session.
    ReuseSession {
        /// Existing session token.
        token: String,
    },
    /// Hand back the identity's live queue entry.
    ReuseQueueEntry {
        /// Existing position.
        position: i64,
        /// Existing queue token.
        token: String,
    },
    /// Insert a new active session.
    CreateSession,
    /// Insert a new queue entry at `position`.
    Enqueue {
        /// Assigned position.
        position: i64,
    },
    /// The identity finished voting within the current liveness window.
    AlreadyCompleted,
}

/// Decide how to admit an identity.
///
/// Order matters: a live session wins over a live queue entry, and both win
/// over creating anything new. Dead rows are ignored here; the caller
/// removes them before inserting.
pub fn decide_admission(
    view: &AdmissionView<'_>,
    now: DateTime<Utc>,
    capacity: u32,
) -> AdmissionDecision {
    if let Some(session) = view.session.filter(|s| s.is_live(now)) {
        if session.status == SessionStatus::Completed {
            return AdmissionDecision::AlreadyCompleted;
        }
        return AdmissionDecision::ReuseSession {
            token: session.session_token.clone(),
        };
    }

    if let Some(entry) = view.queue_entry.filter(|e| e.is_live(now)) {
        return AdmissionDecision::ReuseQueueEntry {
            position: entry.queue_position,
            token: entry.session_token.clone(),
        };
    }

    if view.active_count < capacity {
        AdmissionDecision::CreateSession
    } else {
        AdmissionDecision::Enqueue {
            position: next_position(view.max_position),
        }
    }
}

/// Next queue position: one past the current maximum, or 1 for an empty queue.
#[inline]
pub fn next_position(max_position: Option<i64>) -> i64 {
    max_position.map_or(1, |max| max.saturating_add(1))
}

/// Whether a promotion step may run given the current occupancy.
#[inline]
pub fn can_promote(active_count: u32, capacity: u32) -> bool {
    active_count < capacity
}

/// Pick the live queue entry that is next in line.
pub fn select_promotion_candidate<'a, I>(entries: I, now: DateTime<Utc>) -> Option<&'a QueueEntry>
where
    I: IntoIterator<Item = &'a QueueEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.is_live(now))
        .min_by(|a, b| a.fifo_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn session(status: SessionStatus, expires_at: DateTime<Utc>) -> VotingSession {
        VotingSession {
            id: Uuid::new_v4(),
            identity: "2021/0001".into(),
            session_token: "session-token".into(),
            status,
            created_at: expires_at - Duration::minutes(5),
            last_heartbeat: expires_at - Duration::minutes(5),
            expires_at,
        }
    }

    fn entry(identity: &str, position: i64, expires_at: DateTime<Utc>) -> QueueEntry {
        QueueEntry {
            id: Uuid::new_v4(),
            identity: identity.into(),
            queue_position: position,
            session_token: format!("queue-{identity}"),
            created_at: expires_at - Duration::minutes(5),
            last_heartbeat: expires_at - Duration::minutes(5),
            expires_at,
        }
    }

    fn empty_view(active_count: u32, max_position: Option<i64>) -> AdmissionView<'static> {
        AdmissionView {
            session: None,
            queue_entry: None,
            active_count,
            max_position,
        }
    }

    #[test]
    fn test_live_session_is_reused() {
        let now = Utc::now();
        let s = session(SessionStatus::Voting, now + Duration::minutes(1));
        let view = AdmissionView {
            session: Some(&s),
            ..empty_view(10, None)
        };
        assert_eq!(
            decide_admission(&view, now, 10),
            AdmissionDecision::ReuseSession {
                token: "session-token".into()
            }
        );
    }

    #[test]
    fn test_live_completed_session_blocks_readmission() {
        let now = Utc::now();
        let s = session(SessionStatus::Completed, now + Duration::minutes(1));
        let view = AdmissionView {
            session: Some(&s),
            ..empty_view(0, None)
        };
        assert_eq!(
            decide_admission(&view, now, 10),
            AdmissionDecision::AlreadyCompleted
        );
    }

    #[test]
    fn test_dead_rows_are_ignored() {
        let now = Utc::now();
        let s = session(SessionStatus::Active, now);
        let e = entry("2021/0001", 3, now - Duration::seconds(1));
        let view = AdmissionView {
            session: Some(&s),
            queue_entry: Some(&e),
            active_count: 1,
            max_position: Some(3),
        };
        assert_eq!(
            decide_admission(&view, now, 2),
            AdmissionDecision::CreateSession
        );
    }

    #[test]
    fn test_live_queue_entry_is_reused() {
        let now = Utc::now();
        let e = entry("2021/0001", 7, now + Duration::minutes(2));
        let view = AdmissionView {
            queue_entry: Some(&e),
            ..empty_view(2, Some(9))
        };
        assert_eq!(
            decide_admission(&view, now, 2),
            AdmissionDecision::ReuseQueueEntry {
                position: 7,
                token: "queue-2021/0001".into()
            }
        );
    }

    #[test]
    fn test_full_capacity_enqueues_after_max() {
        let now = Utc::now();
        assert_eq!(
            decide_admission(&empty_view(2, None), now, 2),
            AdmissionDecision::Enqueue { position: 1 }
        );
        assert_eq!(
            decide_admission(&empty_view(3, Some(41)), now, 2),
            AdmissionDecision::Enqueue { position: 42 }
        );
    }

    #[test]
    fn test_candidate_is_smallest_live_position() {
        let now = Utc::now();
        let dead = entry("a", 1, now);
        let second = entry("b", 2, now + Duration::minutes(1));
        let third = entry("c", 3, now + Duration::minutes(1));
        let entries = [third.clone(), dead, second.clone()];

        let picked = select_promotion_candidate(entries.iter(), now);
        assert_eq!(picked.map(|e| e.identity.as_str()), Some("b"));
        assert!(can_promote(1, 2));
        assert!(!can_promote(2, 2));
    }
}
