// Veil - PII classification and dataset anonymization
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use tokio::sync::watch;
use veil::cli::{load_or_default, Cli, Commands};
use veil::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; a broken
    // file is reported by the command itself.
    let file_config = load_or_default(&cli.config).unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| file_config.application.log_level.clone());
    let logging_guard = match init_logging(&log_level, &file_config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Veil starting");

    // Shutdown signal channel; commit checks it between batches
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Received SIGINT (Ctrl+C), cancelling");
        }

        eprintln!("\n⚠️  Shutdown signal received, stopping after the current batch...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5
        }
    };

    // Flush file logs before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Classify(args) => args.execute(&cli.config).await,
        Commands::Preview(args) => args.execute(&cli.config).await,
        Commands::Commit(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Techniques(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
