//! HTTP client for the queue endpoints.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use votegate_entity::{Admission, HeartbeatStatus};

use crate::error::{ClientError, ClientResult, kind_for_status};

/// Join reply as sent on the wire.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum JoinReply {
    Active {
        #[serde(rename = "sessionToken")]
        session_token: String,
    },
    Queued {
        position: i64,
        #[serde(rename = "sessionToken")]
        session_token: String,
    },
}

impl From<JoinReply> for Admission {
    fn from(reply: JoinReply) -> Self {
        match reply {
            JoinReply::Active { session_token } => Admission::Active {
                token: session_token,
            },
            JoinReply::Queued {
                position,
                session_token,
            } => Admission::Queued {
                position,
                token: session_token,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// Talks to a VoteGate server.
#[derive(Debug, Clone)]
pub struct QueueClient {
    http: Client,
    base_url: String,
}

impl QueueClient {
    /// Create a client for the server at `base_url` (e.g. `http://host:8080`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Request admission.
    pub async fn join(&self, registration_number: &str, voting_key: &str) -> ClientResult<Admission> {
        let body = serde_json::json!({
            "registrationNumber": registration_number,
            "votingKey": voting_key,
        });
        let reply: JoinReply = self.post("/api/queue/join", &body).await?;
        Ok(reply.into())
    }

    /// Refresh liveness and read the current standing.
    pub async fn heartbeat(&self, token: &str) -> ClientResult<HeartbeatStatus> {
        let body = serde_json::json!({ "sessionToken": token });
        self.post("/api/queue/heartbeat", &body).await
    }

    /// Give up the session or queue entry.
    pub async fn leave(&self, token: &str) -> ClientResult<()> {
        let body = serde_json::json!({ "sessionToken": token });
        let _: serde_json::Value = self.post("/api/queue/leave", &body).await?;
        Ok(())
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorReply>(&bytes)
            .map(|r| r.error)
            .unwrap_or_else(|_| status.to_string());
        return Err(ClientError::Rejected {
            kind: kind_for_status(status.as_u16()),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_reply_parses_wire_format() {
        let reply: JoinReply =
            serde_json::from_str(r#"{"status":"queued","position":3,"sessionToken":"abc"}"#)
                .unwrap();
        assert_eq!(
            Admission::from(reply),
            Admission::Queued {
                position: 3,
                token: "abc".into()
            }
        );
    }

    #[test]
    fn test_heartbeat_reply_ignores_session_valid() {
        let status: HeartbeatStatus =
            serde_json::from_str(r#"{"status":"active","sessionValid":true}"#).unwrap();
        assert_eq!(status, HeartbeatStatus::Active);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = QueueClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
