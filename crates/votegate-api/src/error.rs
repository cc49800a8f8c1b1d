//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use votegate_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Present on heartbeat failures so clients know to re-join.
    #[serde(rename = "sessionValid", skip_serializing_if = "Option::is_none")]
    pub session_valid: Option<bool>,
}

/// An `AppError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    inner: AppError,
    session_valid: Option<bool>,
}

impl ApiError {
    /// Mark the response with `sessionValid: false` when the token is gone.
    pub fn for_heartbeat(mut self) -> Self {
        if self.inner.kind == ErrorKind::NotFound {
            self.session_valid = Some(false);
        }
        self
    }

    /// The wrapped error.
    pub fn inner(&self) -> &AppError {
        &self.inner
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self {
            inner,
            session_valid: None,
        }
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidCredential => StatusCode::UNAUTHORIZED,
        ErrorKind::AlreadyVoted => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::CapacityRace | ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.inner.kind);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.inner, "Internal server error");
            "Internal server error".to_string()
        } else {
            self.inner.message.clone()
        };

        let body = ApiErrorResponse {
            error: message,
            code: self.inner.kind.to_string(),
            session_valid: self.session_valid,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::AlreadyVoted), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::CapacityRace), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorKind::Database), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_heartbeat_flag_only_on_not_found() {
        let gone = ApiError::from(AppError::not_found("gone")).for_heartbeat();
        assert_eq!(gone.session_valid, Some(false));

        let bad = ApiError::from(AppError::validation("bad")).for_heartbeat();
        assert_eq!(bad.session_valid, None);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = ApiError::from(AppError::database("relation does not exist")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
