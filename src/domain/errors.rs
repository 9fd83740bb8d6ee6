//! Domain error types
//!
//! This module defines the error hierarchy for Veil. Every failure the engine
//! can surface to a caller is one of the [`VeilError`] kinds; configuration
//! problems carry a [`ConfigViolation`] naming the offending field or technique.

use thiserror::Error;

/// Main Veil error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum VeilError {
    /// A technique id that is not present in the registry
    #[error("Unknown technique: '{0}'")]
    UnknownTechnique(String),

    /// The anonymization configuration breaks a validation rule
    #[error("Invalid anonymization config: {0}")]
    InvalidConfig(#[from] ConfigViolation),

    /// Classification could not run at all (e.g. a dataset without columns)
    #[error("Classification failed: {0}")]
    ClassificationFailure(String),

    /// A technique failed on a specific cell
    #[error("Transform failed at row {row}, field '{field}', technique '{technique}': {reason}")]
    TransformFailure {
        /// Zero-based row index in the source dataset
        row: usize,
        /// Column being anonymized
        field: String,
        /// Technique id applied to the column
        technique: String,
        /// Technique-specific failure description
        reason: String,
    },

    /// A commit observed the cancellation signal
    #[error("Commit cancelled after {rows_processed} rows; no output was produced")]
    Cancelled {
        /// Rows transformed before the signal was seen (all discarded)
        rows_processed: usize,
    },

    /// Application configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed dataset documents
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl VeilError {
    /// Builds a [`VeilError::TransformFailure`] for one cell
    pub fn transform(
        row: usize,
        field: impl Into<String>,
        technique: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TransformFailure {
            row,
            field: field.into(),
            technique: technique.into(),
            reason: reason.into(),
        }
    }
}

/// Anonymization config validation failures
///
/// One variant per validation rule so callers can react to each case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    /// No unique identifier column has been chosen
    #[error("a unique identifier column must be selected")]
    MissingUniqueIdentifier,

    /// The unique identifier is not a dataset column
    #[error("unique identifier '{0}' is not a column of the dataset")]
    UnknownUniqueIdentifier(String),

    /// A field selected for anonymization is not a dataset column
    #[error("field '{0}' is not a column of the dataset")]
    FieldNotInDataset(String),

    /// A selected field has no technique assigned
    #[error("field '{0}' has no anonymization technique assigned")]
    MissingTechnique(String),

    /// An encryption technique is used without a key
    #[error("field '{field}' uses technique '{technique}' which requires a non-empty encryption key")]
    MissingEncryptionKey {
        /// Offending field
        field: String,
        /// Technique id
        technique: String,
    },

    /// Generalization level outside 1..=3
    #[error("field '{field}' has generalization level {level}; expected 1, 2 or 3")]
    InvalidGeneralizationLevel {
        /// Offending field
        field: String,
        /// Level supplied
        level: u8,
    },

    /// The masking pattern is not a valid regular expression
    #[error("field '{field}' has an invalid mask pattern: {reason}")]
    InvalidMaskPattern {
        /// Offending field
        field: String,
        /// Regex compiler message
        reason: String,
    },

    /// A lookup file was requested but no selected technique is reversible
    #[error("a lookup file was requested but none of the selected techniques is reversible")]
    LookupWithoutReversibleTechnique,

    /// A lookup file was requested without a file name
    #[error("a lookup file was requested but no lookup file name was given")]
    MissingLookupFileName,

    /// The lookup file name carries directories, a root or `..`
    #[error("lookup file name '{0}' must be a plain file name without directories")]
    InvalidLookupFileName(String),
}

impl ConfigViolation {
    /// Field the violation refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownUniqueIdentifier(f)
            | Self::FieldNotInDataset(f)
            | Self::MissingTechnique(f) => Some(f),
            Self::MissingEncryptionKey { field, .. }
            | Self::InvalidGeneralizationLevel { field, .. }
            | Self::InvalidMaskPattern { field, .. } => Some(field),
            Self::MissingUniqueIdentifier
            | Self::LookupWithoutReversibleTechnique
            | Self::MissingLookupFileName
            | Self::InvalidLookupFileName(_) => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self {
        VeilError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}
