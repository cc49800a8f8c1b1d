//! # votegate-api
//!
//! HTTP API layer for VoteGate built on Axum.
//!
//! Exposes admission, heartbeat, leave, promotion trigger, ledger status,
//! and the vote-submission seam, along with middleware (CORS, logging) and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
