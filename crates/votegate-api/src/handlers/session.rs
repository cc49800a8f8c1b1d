//! Session lifecycle handlers used by the ballot flow.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::dto::{SessionStatusResponse, TokenRequest};
use crate::error::ApiError;
use crate::handlers::require_token;
use crate::state::AppState;

/// POST /api/session/voting
pub async fn begin_voting(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let token = require_token(body, "Session token required")?;
    let session = state.lifecycle.begin_voting(&token).await?;

    Ok(Json(SessionStatusResponse {
        status: session.status,
        expires_at: session.expires_at,
    }))
}

/// POST /api/session/complete
pub async fn complete(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let token = require_token(body, "Session token required")?;
    let session = state.lifecycle.complete(&token).await?;

    Ok(Json(SessionStatusResponse {
        status: session.status,
        expires_at: session.expires_at,
    }))
}
