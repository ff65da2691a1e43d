//! Roster CLI - Main entry point

use anyhow::Context;
use clap::Parser;
use roster_cli::{Cli, Commands};
use roster_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .output(LogOutput::Console)
        .log_file_prefix(log_prefix(&cli.command))
        .build();

    // Environment variables take precedence over the defaults above
    let log_config = match log_config.clone().merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring invalid logging environment: {}", e);
            log_config
        },
    };

    // Dropped when main returns, which flushes file output
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        },
    };

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn log_prefix(command: &Commands) -> String {
    let role = match command {
        Commands::Reader => "reader",
        Commands::Writer => "writer",
        Commands::Students => "students",
        Commands::Analyser(_) => "analyser",
    };
    format!("roster-{}", role)
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Reader => roster_cli::commands::reader::run()
            .await
            .context("Reader failed")?,
        Commands::Writer => roster_cli::commands::writer::run()
            .await
            .context("Writer stopped")?,
        Commands::Students => roster_cli::commands::students::run()
            .await
            .context("Students service failed")?,
        Commands::Analyser(args) => roster_cli::commands::analyser::run(args)
            .await
            .context("Analyser failed")?,
    }
    Ok(())
}
