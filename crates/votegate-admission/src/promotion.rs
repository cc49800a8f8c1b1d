//! Promotion cycle: reap dead entries, then move waiting entries into free
//! slots in FIFO order.

use std::sync::Arc;

use tracing::{error, info, warn};

use votegate_core::config::AdmissionConfig;
use votegate_core::events::QueueEvent;
use votegate_core::{AppResult, Clock};
use votegate_entity::PromotionReport;

use crate::events::EventBus;
use crate::expiry::ExpiryPolicy;
use crate::store::AdmissionStore;

/// One bounded pass of reaping and promotion.
///
/// Safe to run concurrently with itself and with admissions: every
/// promotion is its own atomic store step that re-checks capacity.
#[derive(Debug, Clone)]
pub struct PromotionCycle {
    store: Arc<dyn AdmissionStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    policy: ExpiryPolicy,
    capacity: u32,
    batch_limit: u32,
}

impl PromotionCycle {
    /// Create a new promotion cycle.
    pub fn new(
        config: &AdmissionConfig,
        store: Arc<dyn AdmissionStore>,
        clock: Arc<dyn Clock>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            clock,
            events,
            policy: ExpiryPolicy::new(config.session_ttl()),
            capacity: config.capacity,
            batch_limit: config.promotion_batch_limit,
        }
    }

    /// Run one cycle.
    ///
    /// Storage errors never escape: the cycle stops early, logs, and marks
    /// the report as aborted. The next cycle picks up where this one left off.
    pub async fn run(&self) -> PromotionReport {
        let started = self.clock.now();
        let mut report = PromotionReport {
            promoted: 0,
            reaped_sessions: 0,
            reaped_queue_entries: 0,
            aborted: false,
            timestamp: started,
        };

        match self.store.reap_expired(started).await {
            Ok(summary) => {
                report.reaped_sessions = summary.sessions;
                report.reaped_queue_entries = summary.queue_entries;
                if !summary.is_empty() {
                    self.events.publish(QueueEvent::Reaped {
                        sessions: summary.sessions,
                        queue_entries: summary.queue_entries,
                    });
                }
            }
            Err(e) => {
                error!(error = %e, "Promotion cycle aborted: reap failed");
                report.aborted = true;
                return report;
            }
        }

        // The iteration cap also bounds retries after capacity races.
        for _ in 0..self.batch_limit {
            match self.promote_one().await {
                Ok(true) => report.promoted += 1,
                Ok(false) => break,
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Promotion conflicted with a concurrent step, retrying");
                }
                Err(e) => {
                    error!(
                        error = %e,
                        promoted = report.promoted,
                        "Promotion cycle aborted"
                    );
                    report.aborted = true;
                    break;
                }
            }
        }

        if report.promoted > 0 || report.reaped_sessions > 0 || report.reaped_queue_entries > 0 {
            info!(
                promoted = report.promoted,
                reaped_sessions = report.reaped_sessions,
                reaped_queue_entries = report.reaped_queue_entries,
                "Promotion cycle finished"
            );
        }
        report
    }

    async fn promote_one(&self) -> AppResult<bool> {
        let now = self.clock.now();
        let promotion = self
            .store
            .promote_next(self.capacity, now, self.policy.expires_at(now))
            .await?;

        Ok(match promotion {
            Some(p) => {
                self.events.publish(QueueEvent::Promoted {
                    identity: p.session.identity,
                    position: p.position,
                });
                true
            }
            None => false,
        })
    }
}
