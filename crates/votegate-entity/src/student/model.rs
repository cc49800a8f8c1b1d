//! Student entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An eligible voter as stored in the identity registry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    /// Registration number; the identity key used by the admission core.
    pub registration_number: String,
    /// Display name.
    pub name: String,
    /// Voting key issued to the student. Never serialized.
    #[serde(skip_serializing, default)]
    pub voting_key: String,
    /// Whether the student has already cast a vote.
    pub has_voted: bool,
    /// When the student was registered.
    pub created_at: DateTime<Utc>,
}
