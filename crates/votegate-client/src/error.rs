//! Client error types.

use thiserror::Error;

use votegate_core::error::{AppError, ErrorKind};

/// Errors raised while talking to the queue service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error status.
    #[error("{kind}: {message}")]
    Rejected {
        /// Error category derived from the HTTP status.
        kind: ErrorKind,
        /// Server-provided message.
        message: String,
    },
    /// The request never completed (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered 2xx with a body we could not read.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Client result alias.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether the server said the token is unknown or expired.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { kind: ErrorKind::NotFound, .. })
    }

    /// Whether the request failed before the server could answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected { kind, message } => AppError::new(kind, message),
            ClientError::Transport(e) => AppError::with_source(
                ErrorKind::ServiceUnavailable,
                "Connection lost",
                e,
            ),
            ClientError::Decode(message) => AppError::new(ErrorKind::Serialization, message),
        }
    }
}

/// Recover the server's error category from an HTTP status code.
pub fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::Validation,
        401 => ErrorKind::InvalidCredential,
        403 => ErrorKind::AlreadyVoted,
        404 => ErrorKind::NotFound,
        503 => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_for_client_visible_kinds() {
        assert_eq!(kind_for_status(401), ErrorKind::InvalidCredential);
        assert_eq!(kind_for_status(403), ErrorKind::AlreadyVoted);
        assert_eq!(kind_for_status(404), ErrorKind::NotFound);
        assert_eq!(kind_for_status(502), ErrorKind::Internal);
    }

    #[test]
    fn test_rejected_converts_to_app_error() {
        let err = ClientError::Rejected {
            kind: ErrorKind::AlreadyVoted,
            message: "You have already voted".into(),
        };
        assert!(!err.is_not_found());
        let app: AppError = err.into();
        assert_eq!(app.kind, ErrorKind::AlreadyVoted);
        assert_eq!(app.message, "You have already voted");
    }
}
