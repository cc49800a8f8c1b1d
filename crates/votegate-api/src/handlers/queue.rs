//! Queue handlers: join, heartbeat, leave, promotion trigger, and status.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use validator::Validate;

use votegate_core::AppError;

use crate::dto::{
    HeartbeatResponse, JoinQueueRequest, JoinQueueResponse, LeaveResponse, ManageResponse,
    StatusResponse, TokenRequest,
};
use crate::error::ApiError;
use crate::handlers::require_token;
use crate::state::AppState;

/// POST /api/queue/join
pub async fn join(
    State(state): State<AppState>,
    body: Result<Json<JoinQueueRequest>, JsonRejection>,
) -> Result<Json<JoinQueueResponse>, ApiError> {
    let Json(req) = body.map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;
    req.validate()
        .map_err(|_| AppError::validation("Registration number and voting key are required"))?;

    let admission = state
        .engine
        .request_admission(&req.registration_number, &req.voting_key)
        .await?;

    Ok(Json(JoinQueueResponse::from(admission)))
}

/// POST /api/queue/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    let token = require_token(body, "Session token required")?;

    let status = state
        .heartbeat
        .heartbeat(&token)
        .await
        .map_err(|e| ApiError::from(e).for_heartbeat())?;

    Ok(Json(HeartbeatResponse::from(status)))
}

/// POST /api/queue/leave
pub async fn leave(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<LeaveResponse>, ApiError> {
    let token = require_token(body, "Session token required")?;
    let released = state.engine.leave(&token).await?;

    Ok(Json(LeaveResponse {
        success: true,
        released: released.kind,
    }))
}

/// POST /api/queue/manage
///
/// Runs one promotion cycle immediately. Used by external schedulers and
/// for manual intervention; the in-process runner covers normal operation.
pub async fn manage(State(state): State<AppState>) -> Json<ManageResponse> {
    let report = state.promotion.run().await;

    Json(ManageResponse {
        success: !report.aborted,
        promoted: report.promoted,
        timestamp: report.timestamp,
    })
}

/// GET /api/queue/status
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let ledger = state.ledger.state().await?;
    Ok(Json(StatusResponse::from(ledger)))
}
