//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

/// Join-the-queue request sent by the voting client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueRequest {
    /// Student registration number.
    #[serde(default)]
    #[validate(length(min = 1, message = "Registration number is required"))]
    pub registration_number: String,
    /// Secret voting key.
    #[serde(default)]
    #[validate(length(min = 1, message = "Voting key is required"))]
    pub voting_key: String,
}

/// Any request that only carries a session token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// Session or queue token.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl TokenRequest {
    /// The token, if present and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.session_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
