//! Reservation pipeline - Main Entry Point

use clap::Parser;
use reservation_pipeline::cli::{cmd_ingest, cmd_process, cmd_run, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reservation_pipeline=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ingest) => cmd_ingest(&cli.config)?,
        Some(Commands::Process) => cmd_process(&cli.config)?,
        Some(Commands::Train) => cmd_train(&cli.config)?,
        Some(Commands::Run) | None => cmd_run(&cli.config)?,
    }

    Ok(())
}
