//! Audit logger for anonymization commits
//!
//! One entry per commit attempt. Entries carry counts, techniques and
//! durations only; cell values never reach the audit log.

use crate::anonymization::commit::{CommitState, CommitSummary, FieldSummary};
use crate::anonymization::config::AuditConfig;
use crate::domain::VeilError;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    commit_id: String,
    outcome: &'static str,
    rows: usize,
    fields: &'a [FieldSummary],
    states: &'a [CommitState],
    lookup_records: Option<usize>,
    /// SHA-256 of the lookup file name; the name itself may identify a subject
    lookup_file_hash: Option<String>,
    error: Option<String>,
    duration_ms: u64,
}

/// Audit logger for anonymization operations
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            // Ensure parent directory exists
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Create a logger from the `[audit]` section
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    /// Whether entries are written
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log a successful commit
    pub fn log_commit(&self, summary: &CommitSummary, lookup_file: Option<&Path>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            commit_id: summary.commit_id.to_string(),
            outcome: "succeeded",
            rows: summary.rows,
            fields: &summary.fields,
            states: &summary.states,
            lookup_records: summary.lookup_records,
            lookup_file_hash: lookup_file.map(|p| hash_value(&p.to_string_lossy())),
            error: None,
            duration_ms: summary.duration_ms,
        };

        self.write_entry(&entry)
    }

    /// Log a failed or cancelled commit
    pub fn log_failure(
        &self,
        commit_id: Uuid,
        states: &[CommitState],
        error: &VeilError,
        duration_ms: u64,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let outcome = match error {
            VeilError::Cancelled { .. } => "cancelled",
            _ => "failed",
        };
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            commit_id: commit_id.to_string(),
            outcome,
            rows: 0,
            fields: &[],
            states,
            lookup_records: None,
            lookup_file_hash: None,
            error: Some(error.to_string()),
            duration_ms,
        };

        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            let fields: Vec<String> = entry
                .fields
                .iter()
                .map(|f| format!("{}={}({})", f.field, f.technique, f.transformed))
                .collect();
            writeln!(
                file,
                "[{}] Commit: {} | Outcome: {} | Rows: {} | Fields: {} | Lookup records: {} | Time: {}ms{}",
                entry.timestamp,
                entry.commit_id,
                entry.outcome,
                entry.rows,
                fields.join(","),
                entry.lookup_records.map_or("-".to_string(), |n| n.to_string()),
                entry.duration_ms,
                entry
                    .error
                    .as_ref()
                    .map_or(String::new(), |e| format!(" | Error: {e}"))
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a value using SHA-256
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}
