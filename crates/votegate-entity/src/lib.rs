//! # votegate-entity
//!
//! Entity models for VoteGate. Structs here are either database rows
//! (deriving `sqlx::FromRow`) or value objects returned by the admission
//! core. All of them derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod admission;
pub mod queue;
pub mod session;
pub mod student;

pub use admission::{
    Admission, AdmissionOutcome, AdmissionPath, HeartbeatStatus, LedgerState, PromotionReport,
    ReapSummary,
};
pub use queue::QueueEntry;
pub use session::{SessionStatus, VotingSession};
pub use student::Student;
