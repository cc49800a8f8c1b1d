//! Voting session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use votegate_core::result::AppResult;
use votegate_entity::{SessionStatus, VotingSession};

use super::db_error;

/// Queries on the `voting_sessions` table.
///
/// Holds no pool; every query runs on the connection the caller passes in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionRepository;

impl SessionRepository {
    /// Find the session row for an identity, live or not.
    pub async fn find_by_identity(
        &self,
        conn: &mut PgConnection,
        identity: &str,
    ) -> AppResult<Option<VotingSession>> {
        sqlx::query_as::<_, VotingSession>(
            "SELECT * FROM voting_sessions WHERE student_registration_number = $1",
        )
        .bind(identity)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to find session by identity"))
    }

    /// Find a live session by token.
    pub async fn find_live_by_token(
        &self,
        conn: &mut PgConnection,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<VotingSession>> {
        sqlx::query_as::<_, VotingSession>(
            "SELECT * FROM voting_sessions WHERE session_token = $1 AND expires_at > $2",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to find session by token"))
    }

    /// Count live sessions that occupy a slot.
    pub async fn count_holding_slots(
        &self,
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM voting_sessions \
             WHERE status IN ('active', 'voting') AND expires_at > $1",
        )
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("Failed to count active sessions"))
    }

    /// Insert a new session row.
    pub async fn insert(&self, conn: &mut PgConnection, session: &VotingSession) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO voting_sessions \
             (id, student_registration_number, session_token, status, created_at, last_heartbeat, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(session.id)
        .bind(&session.identity)
        .bind(&session.session_token)
        .bind(session.status)
        .bind(session.created_at)
        .bind(session.last_heartbeat)
        .bind(session.expires_at)
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to create session"))?;
        Ok(())
    }

    /// Slide a session's liveness window.
    pub async fn touch(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE voting_sessions SET last_heartbeat = $2, expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(now)
            .bind(expires_at)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to extend session"))?;
        Ok(())
    }

    /// Change a session's status and slide its liveness window.
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: SessionStatus,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<VotingSession> {
        sqlx::query_as::<_, VotingSession>(
            "UPDATE voting_sessions SET status = $2, last_heartbeat = $3, expires_at = $4 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("Failed to update session status"))
    }

    /// Delete the session row for an identity.
    pub async fn delete_by_identity(
        &self,
        conn: &mut PgConnection,
        identity: &str,
    ) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM voting_sessions WHERE student_registration_number = $1")
                .bind(identity)
                .execute(&mut *conn)
                .await
                .map_err(db_error("Failed to delete session"))?;
        Ok(result.rows_affected())
    }

    /// Delete a session row by ID.
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM voting_sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to delete session"))?;
        Ok(result.rows_affected())
    }

    /// Delete every session whose deadline is not after `now`.
    pub async fn delete_expired(&self, conn: &mut PgConnection, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM voting_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to reap expired sessions"))?;
        Ok(result.rows_affected())
    }
}
