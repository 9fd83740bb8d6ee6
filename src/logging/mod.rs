//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - Human-readable console output
//! - Optional JSON log files with rotation
//! - `RUST_LOG` overrides the configured level
//!
//! Cell values never go to the log; commit events carry ids and counts only.
//!
//! # Example
//!
//! ```no_run
//! use veil::logging::init_logging;
//! use veil::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(columns = 12, "Dataset loaded");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a commit
///
/// # Example
///
/// ```no_run
/// use veil::log_commit_start;
///
/// let commit_id = uuid::Uuid::new_v4();
/// log_commit_start!(commit_id, 10_000, 3);
/// ```
#[macro_export]
macro_rules! log_commit_start {
    ($commit_id:expr, $rows:expr, $fields:expr) => {
        tracing::info!(
            commit_id = %$commit_id,
            rows = $rows,
            fields = $fields,
            "Starting commit"
        );
    };
}

/// Log the completion of a commit
///
/// # Example
///
/// ```no_run
/// use veil::log_commit_complete;
///
/// let commit_id = uuid::Uuid::new_v4();
/// log_commit_complete!(commit_id, 10_000, 9_800, 420);
/// ```
#[macro_export]
macro_rules! log_commit_complete {
    ($commit_id:expr, $rows:expr, $lookup_records:expr, $duration_ms:expr) => {
        tracing::info!(
            commit_id = %$commit_id,
            rows = $rows,
            lookup_records = $lookup_records,
            duration_ms = $duration_ms,
            "Commit completed"
        );
    };
}

/// Log an error with context
///
/// Extra `tracing` fields may follow the context.
///
/// # Example
///
/// ```no_run
/// use veil::log_error_with_context;
/// use veil::domain::VeilError;
///
/// let error = VeilError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
///
/// let commit_id = uuid::Uuid::new_v4();
/// log_error_with_context!(&error, "commit", commit_id = %commit_id);
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
    ($error:expr, $context:expr, $($field:tt)+) => {
        tracing::error!(
            $($field)+,
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a batch processing step
///
/// # Example
///
/// ```no_run
/// use veil::log_batch_processing;
///
/// log_batch_processing!(3, 10, 1000);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr, $rows:expr) => {
        tracing::debug!(
            batch = $current,
            total_batches = $total,
            rows = $rows,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}
