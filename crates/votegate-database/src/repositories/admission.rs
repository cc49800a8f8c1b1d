//! Serialised access to the session and queue tables.

use sqlx::{PgPool, Postgres, Transaction};

use votegate_core::result::AppResult;

use super::db_error;
use super::queue::QueueRepository;
use super::session::SessionRepository;

/// Advisory lock key shared by every admission, heartbeat, and promotion step.
pub const ADMISSION_LOCK_KEY: i64 = 0x566F_7465_4761_7465;

/// Entry point for admission-related transactions.
///
/// Every transaction begun here holds a transaction-scoped advisory lock,
/// so capacity checks and the inserts that depend on them never interleave
/// across connections or nodes.
#[derive(Debug, Clone)]
pub struct AdmissionRepository {
    pool: PgPool,
    sessions: SessionRepository,
    queue: QueueRepository,
}

impl AdmissionRepository {
    /// Create a new admission repository.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            sessions: SessionRepository,
            queue: QueueRepository,
        }
    }

    /// Session table access.
    pub fn sessions(&self) -> &SessionRepository {
        &self.sessions
    }

    /// Queue table access.
    pub fn queue(&self) -> &QueueRepository {
        &self.queue
    }

    /// Begin a transaction and take the admission lock.
    ///
    /// The lock is released when the transaction commits or rolls back.
    pub async fn begin_serialized(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMISSION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to acquire admission lock"))?;

        Ok(tx)
    }

    /// Commit a transaction begun with [`begin_serialized`](Self::begin_serialized).
    pub async fn commit(&self, tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }
}
