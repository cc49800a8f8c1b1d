//! Admission engine: turns a verified identity into an active session or a
//! place in line.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use votegate_core::config::AdmissionConfig;
use votegate_core::error::ErrorKind;
use votegate_core::events::QueueEvent;
use votegate_core::traits::IdentityStore;
use votegate_core::{AppError, AppResult, Clock};
use votegate_entity::{Admission, AdmissionPath};

use crate::events::EventBus;
use crate::expiry::ExpiryPolicy;
use crate::store::{AdmissionStore, AdmitRequest, Release};
use crate::token::{TokenGenerator, token_prefix};

/// Grants sessions up to capacity and queues everyone else.
#[derive(Debug, Clone)]
pub struct AdmissionEngine {
    store: Arc<dyn AdmissionStore>,
    identities: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    tokens: TokenGenerator,
    policy: ExpiryPolicy,
    capacity: u32,
    max_race_retries: u32,
}

impl AdmissionEngine {
    /// Create a new admission engine.
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
            tokens: TokenGenerator::new(),
            policy: ExpiryPolicy::new(config.session_ttl()),
            capacity: config.capacity,
            max_race_retries: config.max_race_retries,
        }
    }

    /// Admit `identity` if its credential checks out.
    ///
    /// Re-entry within the liveness window returns the existing token and
    /// position instead of creating anything new.
    pub async fn request_admission(&self, identity: &str, proof: &str) -> AppResult<Admission> {
        let identity = identity.trim();
        if identity.is_empty() || proof.is_empty() {
            return Err(AppError::validation(
                "Registration number and voting key are required",
            ));
        }

        if !self.identities.verify(identity, proof).await? {
            warn!(identity = %identity, "Admission rejected: invalid credential");
            return Err(AppError::invalid_credential(
                "Invalid registration number or voting key",
            ));
        }

        if self.identities.has_completed(identity).await? {
            info!(identity = %identity, "Admission rejected: already voted");
            return Err(AppError::already_voted("You have already voted"));
        }

        let mut attempt = 0;
        loop {
            let now = self.clock.now();
            let request = AdmitRequest {
                identity: identity.to_string(),
                candidate_token: self.tokens.generate(),
                capacity: self.capacity,
                now,
                expires_at: self.policy.expires_at(now),
            };

            match self.store.admit(&request).await {
                Ok(outcome) => {
                    self.record_admission(identity, &outcome.admission, outcome.path);
                    return Ok(outcome.admission);
                }
                Err(e) if e.is_retryable() && attempt < self.max_race_retries => {
                    attempt += 1;
                    warn!(
                        identity = %identity,
                        attempt = attempt,
                        error = %e,
                        "Admission conflicted with a concurrent request, retrying"
                    );
                    tokio::task::yield_now().await;
                }
                Err(e) if e.is_retryable() => {
                    error!(identity = %identity, attempts = attempt + 1, "Admission retries exhausted");
                    return Err(AppError::with_source(
                        ErrorKind::ServiceUnavailable,
                        "Admission is busy, please try again",
                        e,
                    ));
                }
                Err(e) => {
                    if e.kind != ErrorKind::AlreadyVoted {
                        error!(identity = %identity, error = %e, "Admission failed");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Give up a session or queue entry immediately.
    pub async fn leave(&self, token: &str) -> AppResult<Release> {
        if token.is_empty() {
            return Err(AppError::validation("Session token is required"));
        }

        let now = self.clock.now();
        let Some(released) = self.store.release(token, now).await? else {
            return Err(AppError::not_found("Session not found or expired"));
        };

        info!(
            identity = %released.identity,
            kind = ?released.kind,
            token_prefix = %token_prefix(token),
            "Left voluntarily"
        );
        self.events.publish(QueueEvent::Released {
            identity: released.identity.clone(),
            kind: released.kind,
        });
        Ok(released)
    }

    fn record_admission(&self, identity: &str, admission: &Admission, path: AdmissionPath) {
        match (admission, path) {
            (_, path) if path.is_reentry() => {
                debug!(
                    identity = %identity,
                    path = ?path,
                    token_prefix = %token_prefix(admission.token()),
                    "Admission re-entry"
                );
            }
            (Admission::Active { token }, _) => {
                info!(
                    identity = %identity,
                    token_prefix = %token_prefix(token),
                    "Session created"
                );
                self.events.publish(QueueEvent::SessionCreated {
                    identity: identity.to_string(),
                });
            }
            (Admission::Queued { position, token }, _) => {
                info!(
                    identity = %identity,
                    position = position,
                    token_prefix = %token_prefix(token),
                    "Joined queue"
                );
                self.events.publish(QueueEvent::Enqueued {
                    identity: identity.to_string(),
                    position: *position,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentityStore;
    use crate::store::MemoryAdmissionStore;
    use crate::store::testing::FlakyStore;
    use std::collections::HashSet;
    use votegate_core::ManualClock;

    fn config(capacity: u32) -> AdmissionConfig {
        AdmissionConfig {
            capacity,
            ..AdmissionConfig::default()
        }
    }

    async fn registry(count: usize) -> MemoryIdentityStore {
        let identities = MemoryIdentityStore::new();
        for i in 0..count {
            identities
                .register(format!("2021/{i:04}"), format!("key-{i}"))
                .await;
        }
        identities
    }

    async fn engine_with(
        capacity: u32,
        store: Arc<dyn AdmissionStore>,
        registered: usize,
    ) -> (AdmissionEngine, MemoryIdentityStore) {
        let identities = registry(registered).await;
        let engine = AdmissionEngine::new(
            &config(capacity),
            store,
            Arc::new(identities.clone()),
            Arc::new(ManualClock::default()),
            EventBus::default(),
        );
        (engine, identities)
    }

    #[tokio::test]
    async fn test_invalid_credential_rejected() {
        let (engine, _) = engine_with(2, Arc::new(MemoryAdmissionStore::new()), 1).await;
        let err = engine
            .request_admission("2021/0000", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredential);
        assert_eq!(err.message, "Invalid registration number or voting key");
    }

    #[tokio::test]
    async fn test_already_voted_rejected() {
        let (engine, identities) = engine_with(2, Arc::new(MemoryAdmissionStore::new()), 1).await;
        identities.mark_completed("2021/0000").await.unwrap();
        let err = engine
            .request_admission("2021/0000", "key-0")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyVoted);
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let (engine, _) = engine_with(2, Arc::new(MemoryAdmissionStore::new()), 1).await;
        let err = engine.request_admission("  ", "key-0").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_repeat_admission_is_idempotent() {
        let (engine, _) = engine_with(1, Arc::new(MemoryAdmissionStore::new()), 2).await;

        let first = engine.request_admission("2021/0000", "key-0").await.unwrap();
        let again = engine.request_admission("2021/0000", "key-0").await.unwrap();
        assert_eq!(first, again);

        let queued = engine.request_admission("2021/0001", "key-1").await.unwrap();
        let queued_again = engine.request_admission("2021/0001", "key-1").await.unwrap();
        assert_eq!(queued, queued_again);
        assert_eq!(queued.position(), Some(1));
    }

    #[tokio::test]
    async fn test_leave_unknown_token_is_not_found() {
        let (engine, _) = engine_with(1, Arc::new(MemoryAdmissionStore::new()), 0).await;
        let err = engine.leave("missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_leave_publishes_release() {
        let store = MemoryAdmissionStore::new();
        let identities = registry(1).await;
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let engine = AdmissionEngine::new(
            &config(1),
            Arc::new(store.clone()),
            Arc::new(identities),
            Arc::new(ManualClock::default()),
            events,
        );

        let admission = engine.request_admission("2021/0000", "key-0").await.unwrap();
        engine.leave(admission.token()).await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            QueueEvent::SessionCreated { .. }
        ));
        let released = rx.recv().await.unwrap();
        assert!(released.releases_slot());
        assert!(store.sessions().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admissions_never_exceed_capacity() {
        const CAPACITY: u32 = 100;
        const REQUESTERS: usize = 150;

        let store = MemoryAdmissionStore::new();
        let (engine, _) = engine_with(CAPACITY, Arc::new(store.clone()), REQUESTERS).await;

        let handles: Vec<_> = (0..REQUESTERS)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .request_admission(&format!("2021/{i:04}"), &format!("key-{i}"))
                        .await
                })
            })
            .collect();

        let mut active = 0;
        let mut queued = Vec::new();
        for result in futures::future::join_all(handles).await {
            match result.unwrap().unwrap() {
                Admission::Active { .. } => active += 1,
                Admission::Queued { position, token } => queued.push((position, token)),
            }
        }

        assert_eq!(active, CAPACITY as usize);
        assert_eq!(store.sessions().await.len(), CAPACITY as usize);

        // Stored FIFO order is position order, with no gaps, and every
        // caller was told the position its row actually holds.
        queued.sort_unstable();
        let entries = store.queue_entries().await;
        let stored: Vec<(i64, String)> = entries
            .iter()
            .map(|e| (e.queue_position, e.session_token.clone()))
            .collect();
        assert_eq!(stored, queued);
        assert_eq!(
            stored.iter().map(|(p, _)| *p).collect::<Vec<_>>(),
            (1..=50).collect::<Vec<i64>>()
        );
        assert!(entries.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_queue_positions_follow_arrival_order() {
        let store = MemoryAdmissionStore::new();
        let clock = ManualClock::default();
        let engine = AdmissionEngine::new(
            &config(1),
            Arc::new(store.clone()),
            Arc::new(registry(4).await),
            Arc::new(clock.clone()),
            EventBus::default(),
        );

        for i in [0, 3, 1, 2] {
            engine
                .request_admission(&format!("2021/{i:04}"), &format!("key-{i}"))
                .await
                .unwrap();
            clock.advance(chrono::Duration::seconds(1));
        }

        let entries = store.queue_entries().await;
        let order: Vec<(&str, i64)> = entries
            .iter()
            .map(|e| (e.identity.as_str(), e.queue_position))
            .collect();
        assert_eq!(order, vec![("2021/0003", 1), ("2021/0001", 2), ("2021/0002", 3)]);
        assert!(entries.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_double_submit_creates_one_row() {
        let store = MemoryAdmissionStore::new();
        let (engine, _) = engine_with(1, Arc::new(store.clone()), 1).await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.request_admission("2021/0000", "key-0").await })
            })
            .collect();

        let tokens: HashSet<String> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap().token().to_string())
            .collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(store.sessions().await.len(), 1);
        assert!(store.queue_entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_race_is_retried() {
        let store = Arc::new(FlakyStore::new(MemoryAdmissionStore::new()).with_admit_races(2));
        let (engine, _) = engine_with(1, store, 1).await;

        let admission = engine.request_admission("2021/0000", "key-0").await.unwrap();
        assert!(matches!(admission, Admission::Active { .. }));
    }

    #[tokio::test]
    async fn test_capacity_race_surfaces_after_retries() {
        let store = Arc::new(FlakyStore::new(MemoryAdmissionStore::new()).with_admit_races(10));
        let (engine, _) = engine_with(1, store, 1).await;

        let err = engine
            .request_admission("2021/0000", "key-0")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }
}
