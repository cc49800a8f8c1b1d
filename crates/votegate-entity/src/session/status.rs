//! Session status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a voting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Admitted, ballot not yet opened.
    Active,
    /// Ballot opened, vote in progress.
    Voting,
    /// Vote submitted; the slot is free again.
    Completed,
}

impl SessionStatus {
    /// Whether a session in this state counts against capacity.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, Self::Active | Self::Voting)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Voting => "voting",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "voting" => Ok(Self::Voting),
            "completed" => Ok(Self::Completed),
            other => Err(format!("Unknown session status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupies_slot() {
        assert!(SessionStatus::Active.occupies_slot());
        assert!(SessionStatus::Voting.occupies_slot());
        assert!(!SessionStatus::Completed.occupies_slot());
    }

    #[test]
    fn test_parse_round_trip() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Voting,
            SessionStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<SessionStatus>(), Ok(status));
        }
        assert!("expired".parse::<SessionStatus>().is_err());
    }
}
