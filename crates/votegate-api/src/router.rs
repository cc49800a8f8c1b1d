//! Route definitions for the VoteGate HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route, threading `AppState` through.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(queue_routes())
        .merge(session_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Admission, heartbeat, leave, promotion trigger, and ledger status
fn queue_routes() -> Router<AppState> {
    Router::new()
        .route("/queue/join", post(handlers::queue::join))
        .route("/queue/heartbeat", post(handlers::queue::heartbeat))
        .route("/queue/leave", post(handlers::queue::leave))
        .route("/queue/manage", post(handlers::queue::manage))
        .route("/queue/status", get(handlers::queue::status))
}

/// Ballot lifecycle
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session/voting", post(handlers::session::begin_voting))
        .route("/session/complete", post(handlers::session::complete))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}
