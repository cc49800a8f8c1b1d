//! Pure liveness policy shared by every store.
//!
//! An entry is live while `expires_at > now`. The instant `now` reaches
//! `expires_at` the entry is dead, whether or not it has been reaped yet.

use chrono::{DateTime, Duration, Utc};

/// Sliding-window expiry with a fixed time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl ExpiryPolicy {
    /// Create a policy with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Deadline for an entry created or heartbeated at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        expires_at(now, self.ttl)
    }
}

/// Deadline for an entry touched at `now`.
#[inline]
pub fn expires_at(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now + ttl
}

/// Whether an entry with this deadline is still alive.
#[inline]
pub fn is_live(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at > now
}

/// Whether an entry with this deadline may be reaped.
#[inline]
pub fn is_stale(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    !is_live(expires_at, now)
}
