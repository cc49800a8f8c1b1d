//! Release a session or queue entry on a client's behalf.

use clap::Args;

use votegate_core::config::AppConfig;
use votegate_core::{AppError, AppResult};

use crate::output;

/// Arguments for the leave command
#[derive(Debug, Args)]
pub struct LeaveArgs {
    /// Session or queue token
    pub token: String,

    /// Skip confirmation
    #[arg(long)]
    pub force: bool,
}

/// Execute the leave command
pub async fn execute(args: &LeaveArgs, config: &AppConfig) -> AppResult<()> {
    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("Release this slot? The holder will have to join again.")
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let state = super::open_state(config).await?;
    let released = state.engine.leave(&args.token).await?;

    output::print_success(&format!("Released {:?} held by {}", released.kind, released.identity));
    Ok(())
}
