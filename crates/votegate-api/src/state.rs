//! Application state shared across all handlers.

use std::sync::Arc;

use votegate_admission::{
    AdmissionEngine, AdmissionStore, CapacityLedger, EventBus, HeartbeatHandler, PromotionCycle,
    SessionLifecycle,
};
use votegate_core::Clock;
use votegate_core::config::AppConfig;
use votegate_core::traits::IdentityStore;
use votegate_database::DatabasePool;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool, absent when running entirely in memory.
    pub db: Option<DatabasePool>,
    /// Admission engine.
    pub engine: Arc<AdmissionEngine>,
    /// Heartbeat handler.
    pub heartbeat: Arc<HeartbeatHandler>,
    /// Promotion cycle, for on-demand triggers.
    pub promotion: Arc<PromotionCycle>,
    /// Session lifecycle (vote-submission seam).
    pub lifecycle: Arc<SessionLifecycle>,
    /// Capacity ledger.
    pub ledger: Arc<CapacityLedger>,
    /// Queue event bus.
    pub events: EventBus,
}

impl AppState {
    /// Wire every admission service over one store, identity registry, and clock.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn AdmissionStore>,
        identities: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
        db: Option<DatabasePool>,
    ) -> Self {
        let events = EventBus::default();
        let admission = &config.admission;

        let engine = AdmissionEngine::new(
            admission,
            Arc::clone(&store),
            Arc::clone(&identities),
            Arc::clone(&clock),
            events.clone(),
        );
        let heartbeat = HeartbeatHandler::new(admission, Arc::clone(&store), Arc::clone(&clock));
        let promotion = PromotionCycle::new(
            admission,
            Arc::clone(&store),
            Arc::clone(&clock),
            events.clone(),
        );
        let lifecycle = SessionLifecycle::new(
            admission,
            Arc::clone(&store),
            identities,
            Arc::clone(&clock),
            events.clone(),
        );
        let ledger = CapacityLedger::new(store, clock, admission.capacity);

        Self {
            config: Arc::new(config),
            db,
            engine: Arc::new(engine),
            heartbeat: Arc::new(heartbeat),
            promotion: Arc::new(promotion),
            lifecycle: Arc::new(lifecycle),
            ledger: Arc::new(ledger),
            events,
        }
    }
}
