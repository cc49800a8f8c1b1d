//! Start the VoteGate server.

use clap::Args;

use votegate_core::AppResult;
use votegate_core::config::{AppConfig, StoreBackend};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip database migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> AppResult<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting VoteGate server...");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Capacity: {}", config.admission.capacity);
    println!("  Store:    {}", config.admission.store);

    let db = match config.admission.store {
        StoreBackend::Postgres => {
            let db = super::connect(&config).await?;
            if !args.no_migrate {
                println!("Running database migrations...");
                let version = votegate_database::migration::run_migrations(&db).await?;
                println!("  Schema at version {}", version.unwrap_or_default());
            }
            Some(db)
        }
        StoreBackend::Memory => None,
    };

    votegate_api::run_server(config, db).await
}
