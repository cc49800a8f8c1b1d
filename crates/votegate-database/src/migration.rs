//! Embedded schema migrations.

use sqlx::migrate::Migrator;
use tracing::info;

use votegate_core::error::{AppError, ErrorKind};

use crate::connection::{DatabasePool, SchemaHealth};

/// Migrations compiled in from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Highest migration version shipped with this build.
pub fn latest_version() -> Option<i64> {
    MIGRATOR.iter().map(|m| m.version).max()
}

/// Apply pending migrations, then confirm the admission tables exist.
///
/// Returns the schema version the database is now at.
pub async fn run_migrations(db: &DatabasePool) -> Result<Option<i64>, AppError> {
    let target = latest_version();
    info!(target_version = ?target, "Applying database migrations");

    MIGRATOR.run(db.pool()).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    if db.schema_health().await? != SchemaHealth::Ready {
        return Err(AppError::database(
            "Migrations finished but the admission tables are missing",
        ));
    }

    info!(version = ?target, "Database schema is current");
    Ok(target)
}
