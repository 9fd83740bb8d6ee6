//! Configuration management for Veil.
//!
//! TOML-based application configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VEIL_<SECTION>_<KEY>` environment overrides
//! - Defaults for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use veil::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//! println!("Sampling {} rows", config.classifier.sample_rows);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ClassifierConfig`] - Sampling, threshold, pattern library
//! - [`PreviewConfig`] - Preview row counts
//! - [`CommitConfig`] - Batch size and parallelism
//! - [`AuditConfig`] - Commit audit log
//! - [`LoggingConfig`] - Log file output
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [classifier]
//! sample_rows = 100
//! confidence_threshold = 0.5
//!
//! [commit]
//! batch_size = 1000
//! parallel = true
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/anonymization.log"
//! ```
//!
//! Anonymization plans are separate files, loaded with
//! [`AnonymizationConfig::from_path`](crate::anonymization::AnonymizationConfig::from_path);
//! they use the same `${VAR}` substitution, so encryption keys can stay in
//! the environment:
//!
//! ```bash
//! export VEIL_EMAIL_KEY="..."
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, AuditConfig, ClassifierConfig, CommitConfig, LoggingConfig, PreviewConfig,
    VeilConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
