//! Application builder: wires router, middleware, and state into an Axum app.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use votegate_admission::{AdmissionStoreDispatch, MemoryIdentityStore};
use votegate_core::config::AppConfig;
use votegate_core::traits::IdentityStore;
use votegate_core::{AppError, AppResult, SystemClock};
use votegate_database::DatabasePool;
use votegate_database::repositories::StudentRepository;
use votegate_worker::PromotionRunner;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the VoteGate server until a shutdown signal arrives.
///
/// `db` is required when the admission store is Postgres; it also backs the
/// student registry whenever it is present.
pub async fn run_server(config: AppConfig, db: Option<DatabasePool>) -> AppResult<()> {
    info!("Starting VoteGate server...");

    let store = Arc::new(AdmissionStoreDispatch::from_config(
        &config.admission,
        db.as_ref(),
    )?);

    let identities: Arc<dyn IdentityStore> = match &db {
        Some(db) => Arc::new(StudentRepository::new(db.pool().clone())),
        None => {
            warn!("No database configured; the student registry is empty and every join will be rejected");
            Arc::new(MemoryIdentityStore::new())
        }
    };

    let state = AppState::new(
        config.clone(),
        store,
        identities,
        Arc::new(SystemClock),
        db.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner_handle = if config.scheduler.enabled {
        let runner = PromotionRunner::new(
            (*state.promotion).clone(),
            config.scheduler.clone(),
            Some(state.events.clone()),
        );
        Some(tokio::spawn(async move {
            runner.run(shutdown_rx).await;
        }))
    } else {
        info!("Promotion runner disabled; cycles only run via /api/queue/manage");
        None
    };

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(capacity = config.admission.capacity, "VoteGate server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = runner_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            warn!("Promotion runner did not stop within the grace period");
        }
    }

    if let Some(db) = db {
        db.close().await;
    }

    info!("VoteGate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
