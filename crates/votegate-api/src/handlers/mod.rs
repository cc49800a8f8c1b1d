//! HTTP request handlers organized by domain.

pub mod health;
pub mod queue;
pub mod session;

use axum::extract::rejection::JsonRejection;

use votegate_core::AppError;

use crate::dto::TokenRequest;

/// Pull the session token out of a possibly malformed token body.
pub(crate) fn require_token(
    body: Result<axum::Json<TokenRequest>, JsonRejection>,
    missing: &'static str,
) -> Result<String, AppError> {
    let request = body.map(|axum::Json(r)| r).unwrap_or_default();
    request
        .token()
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(missing))
}
