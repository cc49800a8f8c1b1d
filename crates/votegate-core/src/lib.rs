//! # votegate-core
//!
//! Core crate for VoteGate. Contains configuration schemas, the clock
//! abstraction, queue domain events, the collaborator traits the admission
//! engine talks to, and the unified error system.
//!
//! This crate has **no** internal dependencies on other VoteGate crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AppError;
pub use result::AppResult;
