//! PostgreSQL admission store.
//!
//! Each operation is one transaction that first takes the admission
//! advisory lock, then reads, decides, and writes. Unique constraints on
//! identity and token back this up; a violation surfaces as `CapacityRace`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use votegate_core::events::EntryKind;
use votegate_core::{AppError, AppResult};
use votegate_database::repositories::AdmissionRepository;
use votegate_entity::{
    Admission, AdmissionOutcome, AdmissionPath, HeartbeatStatus, LedgerState, QueueEntry,
    ReapSummary, SessionStatus, VotingSession,
};

use super::{AdmissionStore, AdmitRequest, Promotion, Release, TokenLookup, transition_error};
use crate::decision::{AdmissionDecision, AdmissionView, can_promote, decide_admission};
use crate::token::token_prefix;

/// Admission store backed by the `voting_sessions` and `voting_queue` tables.
#[derive(Debug, Clone)]
pub struct PostgresAdmissionStore {
    repo: AdmissionRepository,
}

impl PostgresAdmissionStore {
    /// Creates a store over the given repository.
    pub fn new(repo: AdmissionRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AdmissionStore for PostgresAdmissionStore {
    async fn admit(&self, request: &AdmitRequest) -> AppResult<AdmissionOutcome> {
        let mut tx = self.repo.begin_serialized().await?;
        let now = request.now;
        let sessions = self.repo.sessions();
        let queue = self.repo.queue();

        let session = sessions.find_by_identity(&mut tx, &request.identity).await?;
        let entry = queue.find_by_identity(&mut tx, &request.identity).await?;
        let active_count = sessions.count_holding_slots(&mut tx, now).await?;
        let max_position = queue.max_position(&mut tx).await?;

        let view = AdmissionView {
            session: session.as_ref(),
            queue_entry: entry.as_ref(),
            active_count: u32::try_from(active_count).unwrap_or(u32::MAX),
            max_position,
        };

        let outcome = match decide_admission(&view, now, request.capacity) {
            AdmissionDecision::ReuseSession { token } => AdmissionOutcome {
                admission: Admission::Active { token },
                path: AdmissionPath::ExistingSession,
            },
            AdmissionDecision::ReuseQueueEntry { position, token } => AdmissionOutcome {
                admission: Admission::Queued { position, token },
                path: AdmissionPath::ExistingQueueEntry,
            },
            AdmissionDecision::AlreadyCompleted => {
                return Err(AppError::already_voted("You have already voted"));
            }
            AdmissionDecision::CreateSession => {
                sessions.delete_by_identity(&mut tx, &request.identity).await?;
                queue.delete_by_identity(&mut tx, &request.identity).await?;
                sessions
                    .insert(
                        &mut tx,
                        &VotingSession {
                            id: Uuid::new_v4(),
                            identity: request.identity.clone(),
                            session_token: request.candidate_token.clone(),
                            status: SessionStatus::Active,
                            created_at: now,
                            last_heartbeat: now,
                            expires_at: request.expires_at,
                        },
                    )
                    .await?;
                AdmissionOutcome {
                    admission: Admission::Active {
                        token: request.candidate_token.clone(),
                    },
                    path: AdmissionPath::Admitted,
                }
            }
            AdmissionDecision::Enqueue { position } => {
                sessions.delete_by_identity(&mut tx, &request.identity).await?;
                queue.delete_by_identity(&mut tx, &request.identity).await?;
                queue
                    .insert(
                        &mut tx,
                        &QueueEntry {
                            id: Uuid::new_v4(),
                            identity: request.identity.clone(),
                            queue_position: position,
                            session_token: request.candidate_token.clone(),
                            created_at: now,
                            last_heartbeat: now,
                            expires_at: request.expires_at,
                        },
                    )
                    .await?;
                AdmissionOutcome {
                    admission: Admission::Queued {
                        position,
                        token: request.candidate_token.clone(),
                    },
                    path: AdmissionPath::Enqueued,
                }
            }
        };

        self.repo.commit(tx).await?;
        Ok(outcome)
    }

    async fn heartbeat(
        &self,
        token: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<HeartbeatStatus>> {
        let mut tx = self.repo.begin_serialized().await?;

        let status = if let Some(session) = self
            .repo
            .sessions()
            .find_live_by_token(&mut tx, token, now)
            .await?
        {
            if !session.status.occupies_slot() {
                return Ok(None);
            }
            self.repo
                .sessions()
                .touch(&mut tx, session.id, now, expires_at)
                .await?;
            Some(HeartbeatStatus::Active)
        } else if let Some(entry) = self
            .repo
            .queue()
            .find_live_by_token(&mut tx, token, now)
            .await?
        {
            self.repo
                .queue()
                .touch(&mut tx, entry.id, now, expires_at)
                .await?;
            Some(HeartbeatStatus::Queued {
                position: entry.queue_position,
            })
        } else {
            None
        };

        self.repo.commit(tx).await?;
        Ok(status)
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> AppResult<ReapSummary> {
        let mut tx = self.repo.begin_serialized().await?;
        let sessions = self.repo.sessions().delete_expired(&mut tx, now).await?;
        let queue_entries = self.repo.queue().delete_expired(&mut tx, now).await?;
        self.repo.commit(tx).await?;

        Ok(ReapSummary {
            sessions,
            queue_entries,
        })
    }

    async fn promote_next(
        &self,
        capacity: u32,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Promotion>> {
        let mut tx = self.repo.begin_serialized().await?;
        let sessions = self.repo.sessions();
        let queue = self.repo.queue();

        let active = sessions.count_holding_slots(&mut tx, now).await?;
        if !can_promote(u32::try_from(active).unwrap_or(u32::MAX), capacity) {
            return Ok(None);
        }

        let Some(head) = queue.head(&mut tx, now).await? else {
            return Ok(None);
        };

        queue.delete(&mut tx, head.id).await?;
        sessions.delete_by_identity(&mut tx, &head.identity).await?;

        let session = VotingSession {
            id: Uuid::new_v4(),
            identity: head.identity.clone(),
            session_token: head.session_token.clone(),
            status: SessionStatus::Active,
            created_at: now,
            last_heartbeat: now,
            expires_at,
        };
        sessions.insert(&mut tx, &session).await?;
        self.repo.commit(tx).await?;

        info!(
            identity = %head.identity,
            position = head.queue_position,
            token_prefix = %token_prefix(&head.session_token),
            "Queue entry promoted"
        );

        Ok(Some(Promotion {
            session,
            position: head.queue_position,
        }))
    }

    async fn ledger_state(&self, capacity: u32, now: DateTime<Utc>) -> AppResult<LedgerState> {
        let mut tx = self.repo.begin_serialized().await?;
        let active = self.repo.sessions().count_holding_slots(&mut tx, now).await?;
        let stats = self.repo.queue().live_stats(&mut tx, now).await?;
        self.repo.commit(tx).await?;

        Ok(LedgerState {
            capacity,
            active: u32::try_from(active).unwrap_or(u32::MAX),
            queued: u32::try_from(stats.queued).unwrap_or(u32::MAX),
            head_position: stats.head_position,
            tail_position: stats.tail_position,
            observed_at: now,
        })
    }

    async fn set_session_status(
        &self,
        token: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<VotingSession>> {
        let mut tx = self.repo.begin_serialized().await?;

        let Some(session) = self
            .repo
            .sessions()
            .find_live_by_token(&mut tx, token, now)
            .await?
        else {
            return Ok(None);
        };

        if !from.contains(&session.status) {
            return Err(transition_error(session.status, to));
        }

        let updated = self
            .repo
            .sessions()
            .update_status(&mut tx, session.id, to, now, expires_at)
            .await?;
        self.repo.commit(tx).await?;
        Ok(Some(updated))
    }

    async fn release(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Release>> {
        let mut tx = self.repo.begin_serialized().await?;

        let released = if let Some(session) = self
            .repo
            .sessions()
            .find_live_by_token(&mut tx, token, now)
            .await?
        {
            self.repo.sessions().delete(&mut tx, session.id).await?;
            Release {
                identity: session.identity,
                kind: EntryKind::Session,
            }
        } else if let Some(entry) = self
            .repo
            .queue()
            .find_live_by_token(&mut tx, token, now)
            .await?
        {
            self.repo.queue().delete(&mut tx, entry.id).await?;
            Release {
                identity: entry.identity,
                kind: EntryKind::QueueEntry,
            }
        } else {
            return Ok(None);
        };

        self.repo.commit(tx).await?;
        Ok(Some(released))
    }

    async fn find_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TokenLookup>> {
        let mut tx = self.repo.begin_serialized().await?;

        let found = match self
            .repo
            .sessions()
            .find_live_by_token(&mut tx, token, now)
            .await?
        {
            Some(session) => Some(TokenLookup::Session(session)),
            None => self
                .repo
                .queue()
                .find_live_by_token(&mut tx, token, now)
                .await?
                .map(TokenLookup::QueueEntry),
        };

        self.repo.commit(tx).await?;
        Ok(found)
    }
}
