//! VoteGate server: admission and queueing for capacity-limited voting.
//!
//! Main entry point that loads configuration, sets up logging, connects
//! storage, and starts the HTTP server with its promotion runner.

use tracing_subscriber::{EnvFilter, fmt};

use votegate_core::AppResult;
use votegate_core::config::{AppConfig, StoreBackend};
use votegate_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> AppResult<AppConfig> {
    let base = std::env::var("VOTEGATE_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("VOTEGATE_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(base.trim_end_matches(".toml"), &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting VoteGate v{}", env!("CARGO_PKG_VERSION"));

    let db = match config.admission.store {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db = DatabasePool::connect(&config.database).await?;

            votegate_database::migration::run_migrations(&db).await?;
            Some(db)
        }
        StoreBackend::Memory => {
            tracing::info!("Using the in-memory admission store; state is lost on restart");
            None
        }
    };

    votegate_api::run_server(config, db).await
}
