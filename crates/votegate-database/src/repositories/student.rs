//! Student repository implementation.
//!
//! Backs the [`IdentityStore`] collaborator with the `students` table.

use async_trait::async_trait;
use sqlx::PgPool;

use votegate_core::result::AppResult;
use votegate_core::traits::IdentityStore;
use votegate_entity::Student;

use super::db_error;

/// Repository for the `students` table.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a student by registration number.
    pub async fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> AppResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE registration_number = $1")
            .bind(registration_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find student"))
    }

    /// Insert or update a student.
    pub async fn upsert(&self, registration_number: &str, name: &str, voting_key: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO students (registration_number, name, voting_key) VALUES ($1, $2, $3) \
             ON CONFLICT (registration_number) DO UPDATE SET name = $2, voting_key = $3",
        )
        .bind(registration_number)
        .bind(name)
        .bind(voting_key)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save student"))?;
        Ok(())
    }

    /// Record that a student has cast a vote.
    pub async fn mark_voted(&self, registration_number: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE students SET has_voted = TRUE WHERE registration_number = $1")
            .bind(registration_number)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to mark student as voted"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IdentityStore for StudentRepository {
    async fn verify(&self, identity: &str, proof: &str) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM students WHERE registration_number = $1 AND voting_key = $2)",
        )
        .bind(identity)
        .bind(proof)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to verify student"))
    }

    async fn has_completed(&self, identity: &str) -> AppResult<bool> {
        let voted: Option<bool> =
            sqlx::query_scalar("SELECT has_voted FROM students WHERE registration_number = $1")
                .bind(identity)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to read voting status"))?;
        Ok(voted.unwrap_or(false))
    }

    async fn mark_completed(&self, identity: &str) -> AppResult<()> {
        if !self.mark_voted(identity).await? {
            tracing::warn!(identity = %identity, "Completed session for unknown student");
        }
        Ok(())
    }
}
