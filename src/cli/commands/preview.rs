//! Preview command implementation
//!
//! Applies an anonymization plan to a handful of rows and prints the
//! before/after pairs. Nothing is written.

use crate::anonymization::{AnonymizationConfig, PreviewService};
use crate::cli::{exit_code, load_or_default, OutputFormat};
use crate::domain::Dataset;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Dataset JSON document
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Anonymization plan (TOML or JSON)
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Rows to preview (defaults to preview.sample_size)
    #[arg(short, long, default_value_t = 0)]
    pub rows: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl PreviewArgs {
    /// Execute the preview command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            dataset = %self.dataset.display(),
            plan = %self.plan.display(),
            "Starting preview command"
        );

        let config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let plan = match AnonymizationConfig::from_path(&self.plan) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to load plan: {e:#}");
                return Ok(2);
            }
        };

        let dataset = match Dataset::from_path(&self.dataset) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Failed to load dataset: {e}");
                return Ok(exit_code(&e));
            }
        };

        let service = PreviewService::from_config(&config.preview);
        let result = match service.preview(&dataset, &plan, self.rows) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Preview failed");
                eprintln!("Preview failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        match self.format {
            OutputFormat::Text => println!("{}", result.format_console()),
            OutputFormat::Json => println!(
                "{}",
                result.format_json().context("Failed to serialize preview")?
            ),
        }

        Ok(0)
    }
}
