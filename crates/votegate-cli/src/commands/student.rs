//! Student registry commands.

use clap::{Args, Subcommand};

use votegate_core::config::AppConfig;
use votegate_core::{AppError, AppResult};
use votegate_database::repositories::StudentRepository;

use crate::output;

/// Arguments for student commands
#[derive(Debug, Args)]
pub struct StudentArgs {
    /// Student subcommand
    #[command(subcommand)]
    pub command: StudentCommand,
}

/// Student subcommands
#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// Register a student or replace their voting key
    Add {
        /// Registration number
        registration_number: String,
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
        /// Voting key; prompted for when omitted
        #[arg(long)]
        voting_key: Option<String>,
    },
    /// Show a student's registry entry
    Show {
        /// Registration number
        registration_number: String,
    },
}

/// Execute student commands
pub async fn execute(args: &StudentArgs, config: &AppConfig) -> AppResult<()> {
    let db = super::connect(config).await?;
    let students = StudentRepository::new(db.pool().clone());

    match &args.command {
        StudentCommand::Add {
            registration_number,
            name,
            voting_key,
        } => {
            let voting_key = match voting_key {
                Some(key) => key.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Voting key")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };
            students
                .upsert(registration_number, name, &voting_key)
                .await?;
            output::print_success(&format!("Student {registration_number} registered"));
        }
        StudentCommand::Show {
            registration_number,
        } => match students.find_by_registration_number(registration_number).await? {
            Some(student) => {
                output::print_kv("Registration number", &student.registration_number);
                output::print_kv("Name", &student.name);
                output::print_kv("Has voted", &student.has_voted.to_string());
            }
            None => {
                output::print_warning(&format!("No student {registration_number}"));
            }
        },
    }

    db.close().await;
    Ok(())
}
