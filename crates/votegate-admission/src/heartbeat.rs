//! Heartbeat handling: sliding-window liveness for sessions and queue entries.

use std::sync::Arc;

use tracing::debug;

use votegate_core::config::AdmissionConfig;
use votegate_core::{AppError, AppResult, Clock};
use votegate_entity::HeartbeatStatus;

use crate::expiry::ExpiryPolicy;
use crate::store::AdmissionStore;
use crate::token::token_prefix;

/// Extends the deadline of whatever a token currently holds.
#[derive(Debug, Clone)]
pub struct HeartbeatHandler {
    store: Arc<dyn AdmissionStore>,
    clock: Arc<dyn Clock>,
    policy: ExpiryPolicy,
}

impl HeartbeatHandler {
    /// Create a new heartbeat handler.
    pub fn new(config: &AdmissionConfig, store: Arc<dyn AdmissionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: ExpiryPolicy::new(config.session_ttl()),
        }
    }

    /// Record a heartbeat for `token`.
    ///
    /// Expired and unknown tokens are both reported as `NotFound`.
    pub async fn heartbeat(&self, token: &str) -> AppResult<HeartbeatStatus> {
        if token.is_empty() {
            return Err(AppError::validation("Session token required"));
        }

        let now = self.clock.now();
        match self
            .store
            .heartbeat(token, now, self.policy.expires_at(now))
            .await?
        {
            Some(status) => {
                debug!(token_prefix = %token_prefix(token), status = ?status, "Heartbeat");
                Ok(status)
            }
            None => {
                debug!(token_prefix = %token_prefix(token), "Heartbeat for unknown or expired token");
                Err(AppError::not_found("Session not found or expired"))
            }
        }
    }
}
