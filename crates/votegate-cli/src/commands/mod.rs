//! CLI command definitions and dispatch.

pub mod cycle;
pub mod leave;
pub mod migrate;
pub mod serve;
pub mod status;
pub mod student;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use votegate_admission::AdmissionStoreDispatch;
use votegate_api::AppState;
use votegate_core::config::{AppConfig, StoreBackend};
use votegate_core::{AppError, AppResult, SystemClock};
use votegate_database::DatabasePool;
use votegate_database::repositories::StudentRepository;

use crate::output::OutputFormat;

/// VoteGate: admission and queueing for capacity-limited voting
#[derive(Debug, Parser)]
#[command(name = "votegate", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded next to the base file
    #[arg(short, long, env = "VOTEGATE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the VoteGate server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Run one promotion cycle now
    Cycle,
    /// Show capacity and queue counts
    Status,
    /// Release a session or queue entry by token
    Leave(leave::LeaveArgs),
    /// Student registry management
    Student(student::StudentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        let config = AppConfig::load_from(&self.config, &self.env)?;

        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Cycle => cycle::execute(&config, self.format).await,
            Commands::Status => status::execute(&config, self.format).await,
            Commands::Leave(args) => leave::execute(args, &config).await,
            Commands::Student(args) => student::execute(args, &config).await,
        }
    }
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> AppResult<DatabasePool> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire the admission services against the shared database.
///
/// One-shot commands act on state other processes can see, so the
/// in-memory store is refused here.
pub async fn open_state(config: &AppConfig) -> AppResult<AppState> {
    if config.admission.store != StoreBackend::Postgres {
        return Err(AppError::configuration(
            "This command needs admission.store = \"postgres\"",
        ));
    }

    let db = connect(config).await?;
    let store = AdmissionStoreDispatch::from_config(&config.admission, Some(&db))?;
    let identities = StudentRepository::new(db.pool().clone());

    Ok(AppState::new(
        config.clone(),
        Arc::new(store),
        Arc::new(identities),
        Arc::new(SystemClock),
        Some(db),
    ))
}
