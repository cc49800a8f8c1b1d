//! # votegate-admission
//!
//! Admission control for VoteGate: a bounded pool of active voting
//! sessions, a FIFO waiting queue for everyone else, heartbeat-driven
//! liveness, and the promotion cycle that moves waiting entries into freed
//! slots.
//!
//! Every check-then-mutate step runs inside a single [`store::AdmissionStore`]
//! call, so capacity and identity uniqueness hold after each step even when
//! admissions, heartbeats, and promotion cycles overlap.

pub mod decision;
pub mod engine;
pub mod events;
pub mod expiry;
pub mod heartbeat;
pub mod identity;
pub mod ledger;
pub mod lifecycle;
pub mod promotion;
pub mod store;
pub mod token;

pub use engine::AdmissionEngine;
pub use events::EventBus;
pub use expiry::ExpiryPolicy;
pub use heartbeat::HeartbeatHandler;
pub use identity::MemoryIdentityStore;
pub use ledger::CapacityLedger;
pub use lifecycle::SessionLifecycle;
pub use promotion::PromotionCycle;
pub use store::{AdmissionStore, AdmissionStoreDispatch};
pub use token::TokenGenerator;
