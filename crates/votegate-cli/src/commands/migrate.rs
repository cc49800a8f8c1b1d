//! Database migration management commands.

use clap::{Args, Subcommand};

use votegate_core::AppResult;
use votegate_core::config::AppConfig;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> AppResult<()> {
    let db = super::connect(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            let version = votegate_database::migration::run_migrations(&db).await?;
            output::print_success(&format!(
                "All migrations applied; schema at version {}",
                version.unwrap_or_default()
            ));
        }
    }

    db.close().await;
    Ok(())
}
