//! Voting queue repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use votegate_core::result::AppResult;
use votegate_entity::QueueEntry;

use super::db_error;

/// Aggregate over the live part of the queue.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct QueueStats {
    /// Live entries.
    pub queued: i64,
    /// Smallest live position.
    pub head_position: Option<i64>,
    /// Largest live position.
    pub tail_position: Option<i64>,
}

/// Queries on the `voting_queue` table, run on the caller's connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueRepository;

impl QueueRepository {
    /// Find the queue row for an identity, live or not.
    pub async fn find_by_identity(
        &self,
        conn: &mut PgConnection,
        identity: &str,
    ) -> AppResult<Option<QueueEntry>> {
        sqlx::query_as::<_, QueueEntry>(
            "SELECT * FROM voting_queue WHERE student_registration_number = $1",
        )
        .bind(identity)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to find queue entry by identity"))
    }

    /// Find a live queue entry by token.
    pub async fn find_live_by_token(
        &self,
        conn: &mut PgConnection,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<QueueEntry>> {
        sqlx::query_as::<_, QueueEntry>(
            "SELECT * FROM voting_queue WHERE session_token = $1 AND expires_at > $2",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to find queue entry by token"))
    }

    /// Largest position among all remaining rows.
    pub async fn max_position(&self, conn: &mut PgConnection) -> AppResult<Option<i64>> {
        sqlx::query_scalar("SELECT MAX(queue_position) FROM voting_queue")
            .fetch_one(&mut *conn)
            .await
            .map_err(db_error("Failed to read queue tail"))
    }

    /// The live entry next in line.
    pub async fn head(
        &self,
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> AppResult<Option<QueueEntry>> {
        sqlx::query_as::<_, QueueEntry>(
            "SELECT * FROM voting_queue WHERE expires_at > $1 \
             ORDER BY queue_position ASC, created_at ASC, student_registration_number ASC \
             LIMIT 1",
        )
        .bind(now)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to read queue head"))
    }

    /// Count and bounds of the live queue.
    pub async fn live_stats(
        &self,
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> AppResult<QueueStats> {
        sqlx::query_as::<_, QueueStats>(
            "SELECT COUNT(*) AS queued, MIN(queue_position) AS head_position, \
             MAX(queue_position) AS tail_position \
             FROM voting_queue WHERE expires_at > $1",
        )
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("Failed to read queue stats"))
    }

    /// Insert a new queue row.
    pub async fn insert(&self, conn: &mut PgConnection, entry: &QueueEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO voting_queue \
             (id, student_registration_number, queue_position, session_token, created_at, last_heartbeat, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(&entry.identity)
        .bind(entry.queue_position)
        .bind(&entry.session_token)
        .bind(entry.created_at)
        .bind(entry.last_heartbeat)
        .bind(entry.expires_at)
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to join queue"))?;
        Ok(())
    }

    /// Slide a queue entry's liveness window.
    pub async fn touch(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE voting_queue SET last_heartbeat = $2, expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(now)
            .bind(expires_at)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to extend queue entry"))?;
        Ok(())
    }

    /// Delete the queue row for an identity.
    pub async fn delete_by_identity(
        &self,
        conn: &mut PgConnection,
        identity: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM voting_queue WHERE student_registration_number = $1")
            .bind(identity)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to delete queue entry"))?;
        Ok(result.rows_affected())
    }

    /// Delete a queue row by ID.
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM voting_queue WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to delete queue entry"))?;
        Ok(result.rows_affected())
    }

    /// Delete every entry whose deadline is not after `now`.
    pub async fn delete_expired(&self, conn: &mut PgConnection, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM voting_queue WHERE expires_at <= $1")
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to reap expired queue entries"))?;
        Ok(result.rows_affected())
    }
}
