//! In-memory admission store guarded by a single Tokio mutex.
//!
//! Suitable for single-node deployments and tests. Holding one lock for
//! the whole of every operation gives the same serialisation the
//! PostgreSQL store gets from its advisory lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use votegate_core::events::EntryKind;
use votegate_core::{AppError, AppResult};
use votegate_entity::{
    Admission, AdmissionOutcome, AdmissionPath, HeartbeatStatus, LedgerState, QueueEntry,
    ReapSummary, SessionStatus, VotingSession,
};

use super::{AdmissionStore, AdmitRequest, Promotion, Release, TokenLookup, transition_error};
use crate::decision::{
    AdmissionDecision, AdmissionView, can_promote, decide_admission, select_promotion_candidate,
};
use crate::expiry::is_stale;
use crate::token::token_prefix;

/// Session and queue tables keyed by identity, plus a token index.
#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<String, VotingSession>,
    queue: HashMap<String, QueueEntry>,
    tokens: HashMap<String, (EntryKind, String)>,
}

impl Tables {
    fn active_count(&self, now: DateTime<Utc>) -> u32 {
        self.sessions.values().filter(|s| s.holds_slot(now)).count() as u32
    }

    fn max_position(&self) -> Option<i64> {
        self.queue.values().map(|e| e.queue_position).max()
    }

    /// Drop whatever rows the identity still has, live or dead.
    fn purge_identity(&mut self, identity: &str) {
        if let Some(old) = self.sessions.remove(identity) {
            self.tokens.remove(&old.session_token);
        }
        if let Some(old) = self.queue.remove(identity) {
            self.tokens.remove(&old.session_token);
        }
    }

    fn live_session_by_token(&self, token: &str, now: DateTime<Utc>) -> Option<&VotingSession> {
        match self.tokens.get(token) {
            Some((EntryKind::Session, identity)) => {
                self.sessions.get(identity).filter(|s| s.is_live(now))
            }
            _ => None,
        }
    }

    fn live_entry_by_token(&self, token: &str, now: DateTime<Utc>) -> Option<&QueueEntry> {
        match self.tokens.get(token) {
            Some((EntryKind::QueueEntry, identity)) => {
                self.queue.get(identity).filter(|e| e.is_live(now))
            }
            _ => None,
        }
    }

    fn insert_session(&mut self, session: VotingSession) {
        self.tokens.insert(
            session.session_token.clone(),
            (EntryKind::Session, session.identity.clone()),
        );
        self.sessions.insert(session.identity.clone(), session);
    }

    fn insert_entry(&mut self, entry: QueueEntry) {
        self.tokens.insert(
            entry.session_token.clone(),
            (EntryKind::QueueEntry, entry.identity.clone()),
        );
        self.queue.insert(entry.identity.clone(), entry);
    }
}

/// Admission store holding all state in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdmissionStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryAdmissionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every session row, live or not. Intended for inspection and tests.
    pub async fn sessions(&self) -> Vec<VotingSession> {
        let tables = self.tables.lock().await;
        tables.sessions.values().cloned().collect()
    }

    /// Every queue row, live or not, in FIFO order.
    pub async fn queue_entries(&self) -> Vec<QueueEntry> {
        let tables = self.tables.lock().await;
        let mut entries: Vec<QueueEntry> = tables.queue.values().cloned().collect();
        entries.sort_by(|a, b| a.fifo_cmp(b));
        entries
    }
}

#[async_trait]
impl AdmissionStore for MemoryAdmissionStore {
    async fn admit(&self, request: &AdmitRequest) -> AppResult<AdmissionOutcome> {
        let mut tables = self.tables.lock().await;
        let now = request.now;

        let view = AdmissionView {
            session: tables.sessions.get(&request.identity),
            queue_entry: tables.queue.get(&request.identity),
            active_count: tables.active_count(now),
            max_position: tables.max_position(),
        };

        match decide_admission(&view, now, request.capacity) {
            AdmissionDecision::ReuseSession { token } => Ok(AdmissionOutcome {
                admission: Admission::Active { token },
                path: AdmissionPath::ExistingSession,
            }),
            AdmissionDecision::ReuseQueueEntry { position, token } => Ok(AdmissionOutcome {
                admission: Admission::Queued { position, token },
                path: AdmissionPath::ExistingQueueEntry,
            }),
            AdmissionDecision::AlreadyCompleted => {
                Err(AppError::already_voted("You have already voted"))
            }
            AdmissionDecision::CreateSession => {
                if tables.tokens.contains_key(&request.candidate_token) {
                    return Err(AppError::capacity_race("Token collision"));
                }
                tables.purge_identity(&request.identity);
                tables.insert_session(VotingSession {
                    id: Uuid::new_v4(),
                    identity: request.identity.clone(),
                    session_token: request.candidate_token.clone(),
                    status: SessionStatus::Active,
                    created_at: now,
                    last_heartbeat: now,
                    expires_at: request.expires_at,
                });
                Ok(AdmissionOutcome {
                    admission: Admission::Active {
                        token: request.candidate_token.clone(),
                    },
                    path: AdmissionPath::Admitted,
                })
            }
            AdmissionDecision::Enqueue { position } => {
                if tables.tokens.contains_key(&request.candidate_token) {
                    return Err(AppError::capacity_race("Token collision"));
                }
                tables.purge_identity(&request.identity);
                tables.insert_entry(QueueEntry {
                    id: Uuid::new_v4(),
                    identity: request.identity.clone(),
                    queue_position: position,
                    session_token: request.candidate_token.clone(),
                    created_at: now,
                    last_heartbeat: now,
                    expires_at: request.expires_at,
                });
                Ok(AdmissionOutcome {
                    admission: Admission::Queued {
                        position,
                        token: request.candidate_token.clone(),
                    },
                    path: AdmissionPath::Enqueued,
                })
            }
        }
    }

    async fn heartbeat(
        &self,
        token: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<HeartbeatStatus>> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;

        let Some((kind, identity)) = tables.tokens.get(token) else {
            return Ok(None);
        };

        match kind {
            EntryKind::Session => {
                let Some(session) = tables
                    .sessions
                    .get_mut(identity)
                    .filter(|s| s.holds_slot(now))
                else {
                    return Ok(None);
                };
                session.last_heartbeat = now;
                session.expires_at = expires_at;
                Ok(Some(HeartbeatStatus::Active))
            }
            EntryKind::QueueEntry => {
                let Some(entry) = tables.queue.get_mut(identity).filter(|e| e.is_live(now))
                else {
                    return Ok(None);
                };
                entry.last_heartbeat = now;
                entry.expires_at = expires_at;
                Ok(Some(HeartbeatStatus::Queued {
                    position: entry.queue_position,
                }))
            }
        }
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> AppResult<ReapSummary> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;

        let before_sessions = tables.sessions.len();
        let before_queue = tables.queue.len();

        tables.sessions.retain(|_, s| !is_stale(s.expires_at, now));
        tables.queue.retain(|_, e| !is_stale(e.expires_at, now));

        let sessions = &tables.sessions;
        let queue = &tables.queue;
        tables.tokens.retain(|_, (kind, identity)| match kind {
            EntryKind::Session => sessions.contains_key(identity.as_str()),
            EntryKind::QueueEntry => queue.contains_key(identity.as_str()),
        });

        let summary = ReapSummary {
            sessions: (before_sessions - tables.sessions.len()) as u64,
            queue_entries: (before_queue - tables.queue.len()) as u64,
        };
        if !summary.is_empty() {
            debug!(
                sessions = summary.sessions,
                queue_entries = summary.queue_entries,
                "Reaped expired rows from memory store"
            );
        }
        Ok(summary)
    }

    async fn promote_next(
        &self,
        capacity: u32,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Promotion>> {
        let mut tables = self.tables.lock().await;

        if !can_promote(tables.active_count(now), capacity) {
            return Ok(None);
        }

        let Some(head) = select_promotion_candidate(tables.queue.values(), now).cloned() else {
            return Ok(None);
        };

        tables.purge_identity(&head.identity);
        let session = VotingSession {
            id: Uuid::new_v4(),
            identity: head.identity.clone(),
            session_token: head.session_token.clone(),
            status: SessionStatus::Active,
            created_at: now,
            last_heartbeat: now,
            expires_at,
        };
        tables.insert_session(session.clone());

        info!(
            identity = %head.identity,
            position = head.queue_position,
            token_prefix = %token_prefix(&head.session_token),
            "Queue entry promoted in memory store"
        );

        Ok(Some(Promotion {
            session,
            position: head.queue_position,
        }))
    }

    async fn ledger_state(&self, capacity: u32, now: DateTime<Utc>) -> AppResult<LedgerState> {
        let tables = self.tables.lock().await;
        let live_positions: Vec<i64> = tables
            .queue
            .values()
            .filter(|e| e.is_live(now))
            .map(|e| e.queue_position)
            .collect();

        Ok(LedgerState {
            capacity,
            active: tables.active_count(now),
            queued: live_positions.len() as u32,
            head_position: live_positions.iter().copied().min(),
            tail_position: live_positions.iter().copied().max(),
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
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;

        let Some(identity) = tables
            .live_session_by_token(token, now)
            .map(|s| s.identity.clone())
        else {
            return Ok(None);
        };
        let Some(session) = tables.sessions.get_mut(&identity) else {
            return Ok(None);
        };

        if !from.contains(&session.status) {
            return Err(transition_error(session.status, to));
        }

        session.status = to;
        session.last_heartbeat = now;
        session.expires_at = expires_at;
        Ok(Some(session.clone()))
    }

    async fn release(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Release>> {
        let mut tables = self.tables.lock().await;

        let released = if let Some(session) = tables.live_session_by_token(token, now) {
            Release {
                identity: session.identity.clone(),
                kind: EntryKind::Session,
            }
        } else if let Some(entry) = tables.live_entry_by_token(token, now) {
            Release {
                identity: entry.identity.clone(),
                kind: EntryKind::QueueEntry,
            }
        } else {
            return Ok(None);
        };

        match released.kind {
            EntryKind::Session => {
                tables.sessions.remove(&released.identity);
            }
            EntryKind::QueueEntry => {
                tables.queue.remove(&released.identity);
            }
        }
        tables.tokens.remove(token);

        Ok(Some(released))
    }

    async fn find_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TokenLookup>> {
        let tables = self.tables.lock().await;
        if let Some(session) = tables.live_session_by_token(token, now) {
            return Ok(Some(TokenLookup::Session(session.clone())));
        }
        Ok(tables
            .live_entry_by_token(token, now)
            .map(|e| TokenLookup::QueueEntry(e.clone())))
    }
}
