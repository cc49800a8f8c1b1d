//! Fault-injecting store wrapper for tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use votegate_core::{AppError, AppResult};
use votegate_entity::{
    AdmissionOutcome, HeartbeatStatus, LedgerState, ReapSummary, SessionStatus, VotingSession,
};

use super::{AdmissionStore, AdmitRequest, MemoryAdmissionStore, Promotion, Release, TokenLookup};

/// Wraps a memory store and fails selected calls.
#[derive(Debug)]
pub(crate) struct FlakyStore {
    inner: MemoryAdmissionStore,
    admit_races: AtomicU32,
    promote_races: AtomicU32,
    promote_outage: AtomicBool,
    reap_outage: AtomicBool,
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl FlakyStore {
    pub(crate) fn new(inner: MemoryAdmissionStore) -> Self {
        Self {
            inner,
            admit_races: AtomicU32::new(0),
            promote_races: AtomicU32::new(0),
            promote_outage: AtomicBool::new(false),
            reap_outage: AtomicBool::new(false),
        }
    }

    /// Report a capacity race on the next `n` admissions.
    pub(crate) fn with_admit_races(self, n: u32) -> Self {
        self.admit_races.store(n, Ordering::SeqCst);
        self
    }

    /// Report a capacity race on the next `n` promotions.
    pub(crate) fn with_promote_races(self, n: u32) -> Self {
        self.promote_races.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every promotion with a database error.
    pub(crate) fn with_promote_outage(self) -> Self {
        self.promote_outage.store(true, Ordering::SeqCst);
        self
    }

    /// Fail every reap with a database error.
    pub(crate) fn with_reap_outage(self) -> Self {
        self.reap_outage.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl AdmissionStore for FlakyStore {
    async fn admit(&self, request: &AdmitRequest) -> AppResult<AdmissionOutcome> {
        if take_one(&self.admit_races) {
            return Err(AppError::capacity_race("unique violation"));
        }
        self.inner.admit(request).await
    }

    async fn heartbeat(
        &self,
        token: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<HeartbeatStatus>> {
        self.inner.heartbeat(token, now, expires_at).await
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> AppResult<ReapSummary> {
        if self.reap_outage.load(Ordering::SeqCst) {
            return Err(AppError::database("connection refused"));
        }
        self.inner.reap_expired(now).await
    }

    async fn promote_next(
        &self,
        capacity: u32,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Promotion>> {
        if self.promote_outage.load(Ordering::SeqCst) {
            return Err(AppError::database("connection refused"));
        }
        if take_one(&self.promote_races) {
            return Err(AppError::capacity_race("serialization failure"));
        }
        self.inner.promote_next(capacity, now, expires_at).await
    }

    async fn ledger_state(&self, capacity: u32, now: DateTime<Utc>) -> AppResult<LedgerState> {
        self.inner.ledger_state(capacity, now).await
    }

    async fn set_session_status(
        &self,
        token: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<VotingSession>> {
        self.inner
            .set_session_status(token, from, to, now, expires_at)
            .await
    }

    async fn release(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Release>> {
        self.inner.release(token, now).await
    }

    async fn find_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TokenLookup>> {
        self.inner.find_by_token(token, now).await
    }
}
