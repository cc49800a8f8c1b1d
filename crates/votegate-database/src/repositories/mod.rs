//! Repository implementations for VoteGate entities.
//!
//! Session and queue repositories take an explicit `&mut PgConnection` so
//! that callers can run several statements inside one locked transaction.

pub mod admission;
pub mod queue;
pub mod session;
pub mod student;

pub use admission::AdmissionRepository;
pub use queue::QueueRepository;
pub use session::SessionRepository;
pub use student::StudentRepository;

use votegate_core::error::AppError;

/// Build a `map_err` adapter that keeps conflict classification.
///
/// Unique violations and serialization failures stay `CapacityRace` so the
/// admission engine can retry them; everything else is a database error.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let mapped = AppError::from(e);
        AppError {
            message: format!("{context}: {}", mapped.message),
            ..mapped
        }
    }
}
