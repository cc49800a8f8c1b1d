//! Session lifecycle transitions driven by the vote-submission flow.

use std::sync::Arc;

use tracing::{info, warn};

use votegate_core::config::AdmissionConfig;
use votegate_core::events::QueueEvent;
use votegate_core::traits::IdentityStore;
use votegate_core::{AppError, AppResult, Clock};
use votegate_entity::{SessionStatus, VotingSession};

use crate::events::EventBus;
use crate::expiry::ExpiryPolicy;
use crate::store::{AdmissionStore, TokenLookup, transition_error};
use crate::token::token_prefix;

/// Moves sessions through `active -> voting -> completed`.
///
/// Ballot contents are not seen here; the caller submits the vote and then
/// reports completion.
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    store: Arc<dyn AdmissionStore>,
    identities: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    policy: ExpiryPolicy,
}

impl SessionLifecycle {
    /// Create a new lifecycle service.
    pub fn new(
        config: &AdmissionConfig,
        store: Arc<dyn AdmissionStore>,
        identities: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            identities,
            clock,
            events,
            policy: ExpiryPolicy::new(config.session_ttl()),
        }
    }

    /// Mark that the holder has opened the ballot. Idempotent.
    pub async fn begin_voting(&self, token: &str) -> AppResult<VotingSession> {
        let session = self
            .transition(
                token,
                &[SessionStatus::Active, SessionStatus::Voting],
                SessionStatus::Voting,
            )
            .await?;
        info!(identity = %session.identity, token_prefix = %token_prefix(token), "Voting started");
        Ok(session)
    }

    /// Mark the session completed, freeing its slot. Idempotent.
    ///
    /// Completion is recorded in the identity store before the session
    /// changes, so a failed write leaves the slot held and the session
    /// retryable.
    pub async fn complete(&self, token: &str) -> AppResult<VotingSession> {
        const FROM: [SessionStatus; 3] = [
            SessionStatus::Active,
            SessionStatus::Voting,
            SessionStatus::Completed,
        ];

        if token.is_empty() {
            return Err(AppError::validation("Session token is required"));
        }
        let session = match self.store.find_by_token(token, self.clock.now()).await? {
            Some(TokenLookup::Session(session)) => session,
            _ => return Err(AppError::not_found("Session not found or expired")),
        };
        if !FROM.contains(&session.status) {
            return Err(transition_error(session.status, SessionStatus::Completed));
        }

        if let Err(e) = self.identities.mark_completed(&session.identity).await {
            warn!(identity = %session.identity, error = %e, "Failed to record completion");
            return Err(e);
        }

        let session = self
            .transition(token, &FROM, SessionStatus::Completed)
            .await?;

        info!(identity = %session.identity, token_prefix = %token_prefix(token), "Session completed");
        self.events.publish(QueueEvent::Completed {
            identity: session.identity.clone(),
        });
        Ok(session)
    }

    async fn transition(
        &self,
        token: &str,
        from: &[SessionStatus],
        to: SessionStatus,
    ) -> AppResult<VotingSession> {
        if token.is_empty() {
            return Err(AppError::validation("Session token is required"));
        }
        let now = self.clock.now();
        self.store
            .set_session_status(token, from, to, now, self.policy.expires_at(now))
            .await?
            .ok_or_else(|| AppError::not_found("Session not found or expired"))
    }
}
