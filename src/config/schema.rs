//! Configuration schema types
//!
//! Maps the sections of `veil.toml`. Every section has defaults, so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::anonymization::config::AuditConfig;

/// Main Veil configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// PII classification settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Preview settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Commit settings
    #[serde(default)]
    pub commit: CommitConfig,

    /// Audit log settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeilConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.classifier.validate()?;
        self.preview.validate()?;
        self.commit.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// PII classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Rows sampled per classification
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Confidence at or above which a column is flagged as PII
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Pattern library replacing the built-in one
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Column-name keywords that force a PII flag, on top of the defaults
    #[serde(default)]
    pub high_risk_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_rows: default_sample_rows(),
            confidence_threshold: default_confidence_threshold(),
            pattern_library: None,
            high_risk_keywords: Vec::new(),
        }
    }
}

impl ClassifierConfig {
    fn validate(&self) -> Result<(), String> {
        if self.sample_rows == 0 {
            return Err("classifier.sample_rows must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "classifier.confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            ));
        }

        if let Some(path) = &self.pattern_library {
            if !path.exists() {
                return Err(format!(
                    "classifier.pattern_library not found: {}",
                    path.display()
                ));
            }
        }

        if self.high_risk_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err("classifier.high_risk_keywords cannot contain empty entries".to_string());
        }

        Ok(())
    }
}

/// Preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Rows previewed when the caller does not ask for a count
    #[serde(default = "default_preview_sample_size")]
    pub sample_size: usize,

    /// Upper bound on previewed rows
    #[serde(default = "default_max_sample_size")]
    pub max_sample_size: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            sample_size: default_preview_sample_size(),
            max_sample_size: default_max_sample_size(),
        }
    }
}

impl PreviewConfig {
    fn validate(&self) -> Result<(), String> {
        if self.sample_size == 0 {
            return Err("preview.sample_size must be > 0".to_string());
        }
        if self.max_sample_size < self.sample_size {
            return Err(format!(
                "preview.max_sample_size ({}) must be >= preview.sample_size ({})",
                self.max_sample_size, self.sample_size
            ));
        }
        Ok(())
    }
}

/// Commit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Rows per batch; cancellation is checked between batches
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Shard each batch across worker threads
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            parallel: true,
        }
    }
}

impl CommitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > 100_000 {
            return Err(format!(
                "commit.batch_size must be between 1 and 100000, got {}",
                self.batch_size
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sample_rows() -> usize {
    100
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_preview_sample_size() -> usize {
    5
}

fn default_max_sample_size() -> usize {
    100
}

fn default_batch_size() -> usize {
    1000
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_empty_file_is_valid() {
        let config: VeilConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.classifier.sample_rows, 100);
        assert_eq!(config.preview.sample_size, 5);
        assert_eq!(config.commit.batch_size, 1000);
        assert!(config.commit.parallel);
        assert!(config.audit.enabled);
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test_case(0, 0.5 ; "zero sample rows")]
    #[test_case(100, 1.5 ; "threshold above one")]
    #[test_case(100, -0.1 ; "negative threshold")]
    fn test_classifier_config_rejects(sample_rows: usize, threshold: f32) {
        let config = ClassifierConfig {
            sample_rows,
            confidence_threshold: threshold,
            ..ClassifierConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_classifier_missing_pattern_library() {
        let config = ClassifierConfig {
            pattern_library: Some(PathBuf::from("/nonexistent/patterns.toml")),
            ..ClassifierConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("pattern_library"));
    }

    #[test]
    fn test_preview_config_validation() {
        let mut config = PreviewConfig::default();
        assert!(config.validate().is_ok());

        config.max_sample_size = 2;
        assert!(config.validate().is_err());
    }

    #[test_case(0, false ; "zero")]
    #[test_case(1, true ; "one")]
    #[test_case(100_000, true ; "upper bound")]
    #[test_case(100_001, false ; "too large")]
    fn test_commit_batch_size(batch_size: usize, valid: bool) {
        let config = CommitConfig {
            batch_size,
            parallel: false,
        };
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = " ".to_string();
        assert!(config.validate().is_err());
    }
}
