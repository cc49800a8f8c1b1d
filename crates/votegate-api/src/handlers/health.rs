//! Health check handler.

use axum::Json;
use axum::extract::State;

use votegate_database::connection::SchemaHealth;

use crate::dto::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match &state.db {
        Some(db) => Some(match db.schema_health().await {
            Ok(SchemaHealth::Ready) => "healthy".to_string(),
            Ok(SchemaHealth::Unmigrated) => "unmigrated".to_string(),
            Err(_) => "unhealthy".to_string(),
        }),
        None => None,
    };

    let status = match database.as_deref() {
        Some("healthy") | None => "ok",
        Some(_) => "degraded",
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.config.admission.store.to_string(),
        database,
    }))
}
