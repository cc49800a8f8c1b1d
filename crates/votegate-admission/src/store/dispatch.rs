//! Store selection by configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use votegate_core::config::{AdmissionConfig, StoreBackend};
use votegate_core::{AppError, AppResult};
use votegate_database::DatabasePool;
use votegate_database::repositories::AdmissionRepository;
use votegate_entity::{
    AdmissionOutcome, HeartbeatStatus, LedgerState, ReapSummary, SessionStatus, VotingSession,
};

use super::memory::MemoryAdmissionStore;
use super::postgres::PostgresAdmissionStore;
use super::{AdmissionStore, AdmitRequest, Promotion, Release, TokenLookup};

/// Dispatcher over the available admission stores.
///
/// Switches between the in-memory and PostgreSQL stores based on configuration.
#[derive(Debug, Clone)]
pub enum AdmissionStoreDispatch {
    /// In-memory store (single node).
    Memory(MemoryAdmissionStore),
    /// PostgreSQL store (any number of nodes).
    Postgres(PostgresAdmissionStore),
}

impl AdmissionStoreDispatch {
    /// Build the store named by `config.store`.
    ///
    /// The PostgreSQL store needs a connected pool.
    pub fn from_config(config: &AdmissionConfig, db: Option<&DatabasePool>) -> AppResult<Self> {
        let store = match config.store {
            StoreBackend::Memory => Self::Memory(MemoryAdmissionStore::new()),
            StoreBackend::Postgres => {
                let db = db.ok_or_else(|| {
                    AppError::configuration("The postgres admission store requires a database")
                })?;
                Self::Postgres(PostgresAdmissionStore::new(AdmissionRepository::new(
                    db.pool().clone(),
                )))
            }
        };
        info!(store = %config.store, capacity = config.capacity, "Admission store ready");
        Ok(store)
    }
}

#[async_trait]
impl AdmissionStore for AdmissionStoreDispatch {
    async fn admit(&self, request: &AdmitRequest) -> AppResult<AdmissionOutcome> {
        match self {
            Self::Memory(inner) => inner.admit(request).await,
            Self::Postgres(inner) => inner.admit(request).await,
        }
    }

    async fn heartbeat(
        &self,
        token: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<HeartbeatStatus>> {
        match self {
            Self::Memory(inner) => inner.heartbeat(token, now, expires_at).await,
            Self::Postgres(inner) => inner.heartbeat(token, now, expires_at).await,
        }
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> AppResult<ReapSummary> {
        match self {
            Self::Memory(inner) => inner.reap_expired(now).await,
            Self::Postgres(inner) => inner.reap_expired(now).await,
        }
    }

    async fn promote_next(
        &self,
        capacity: u32,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Promotion>> {
        match self {
            Self::Memory(inner) => inner.promote_next(capacity, now, expires_at).await,
            Self::Postgres(inner) => inner.promote_next(capacity, now, expires_at).await,
        }
    }

    async fn ledger_state(&self, capacity: u32, now: DateTime<Utc>) -> AppResult<LedgerState> {
        match self {
            Self::Memory(inner) => inner.ledger_state(capacity, now).await,
            Self::Postgres(inner) => inner.ledger_state(capacity, now).await,
        }
    }

    async fn set_session_status(
        &self,
        token: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<VotingSession>> {
        match self {
            Self::Memory(inner) => {
                inner
                    .set_session_status(token, from, to, now, expires_at)
                    .await
            }
            Self::Postgres(inner) => {
                inner
                    .set_session_status(token, from, to, now, expires_at)
                    .await
            }
        }
    }

    async fn release(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Release>> {
        match self {
            Self::Memory(inner) => inner.release(token, now).await,
            Self::Postgres(inner) => inner.release(token, now).await,
        }
    }

    async fn find_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TokenLookup>> {
        match self {
            Self::Memory(inner) => inner.find_by_token(token, now).await,
            Self::Postgres(inner) => inner.find_by_token(token, now).await,
        }
    }
}
