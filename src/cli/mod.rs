//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Veil using clap.
//!
//! Exit codes: 0 success, 2 configuration or validation error, 3 transform
//! failure, 4 cancelled, 5 fatal error.

pub mod commands;

use crate::config::{load_config, VeilConfig};
use crate::domain::VeilError;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Veil - PII classification and dataset anonymization
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(version, about, long_about = None)]
#[command(author = "Veil Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "veil.toml", env = "VEIL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VEIL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect PII columns in a dataset
    Classify(commands::classify::ClassifyArgs),

    /// Show how an anonymization plan transforms a few rows
    Preview(commands::preview::PreviewArgs),

    /// Anonymize a whole dataset
    Commit(commands::commit::CommitArgs),

    /// List available anonymization techniques
    Techniques(commands::techniques::TechniquesArgs),

    /// Validate configuration file, and optionally a plan against a dataset
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Output format for report-style commands
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Loads `path`, or falls back to defaults when no file exists there
///
/// # Errors
///
/// An existing file that fails to load or validate is an error.
pub fn load_or_default(path: &str) -> crate::domain::Result<VeilConfig> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::debug!(config_path = %path, "No configuration file, using defaults");
        Ok(VeilConfig::default())
    }
}

/// Process exit code for an engine error
pub fn exit_code(error: &VeilError) -> i32 {
    match error {
        VeilError::UnknownTechnique(_)
        | VeilError::InvalidConfig(_)
        | VeilError::Configuration(_)
        | VeilError::Dataset(_) => 2,
        VeilError::TransformFailure { .. } => 3,
        VeilError::Cancelled { .. } => 4,
        VeilError::ClassificationFailure(_) | VeilError::Serialization(_) | VeilError::Io(_) => 5,
    }
}
