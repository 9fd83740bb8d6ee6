//! Apply/commit service
//!
//! Runs the transform engine over every row and builds a new anonymized
//! dataset plus, when requested, the lookup table. A commit is all-or-nothing:
//! the first failing cell (in row order) aborts it, and any lookup records
//! produced so far are dropped and zeroized.
//!
//! Rows are processed in batches of `batch_size`. The cancellation flag is
//! checked before each batch; each batch may be sharded across rayon workers,
//! with results merged back in row order.

use crate::anonymization::audit::AuditLogger;
use crate::anonymization::config::{AnonymizationConfig, ValidatedConfig};
use crate::anonymization::lookup::{LookupGenerator, LookupRecord, LookupTable};
use crate::anonymization::technique::TechniqueId;
use crate::anonymization::transform::{transform_field, TransformContext};
use crate::config::CommitConfig;
use crate::domain::{cell_text, Dataset, Result, Row, VeilError};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use uuid::Uuid;

/// Commit lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    /// Config is being checked against the dataset
    Validating,
    /// Rows are being transformed
    Transforming,
    /// Output produced
    Succeeded,
    /// Aborted; no output produced
    Failed,
}

/// Anonymized copy of a dataset
#[derive(Debug, Clone)]
pub struct AnonymizedDataset {
    /// Commit that produced it
    pub commit_id: Uuid,
    /// When the commit finished
    pub created_at: DateTime<Utc>,
    /// Columns whose values were replaced
    pub anonymized_fields: Vec<String>,
    dataset: Dataset,
}

impl AnonymizedDataset {
    /// The anonymized table
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Consumes the wrapper, returning the table
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

/// Per-field commit counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    /// Column name
    pub field: String,
    /// Technique applied
    pub technique: TechniqueId,
    /// Non-null cells transformed
    pub transformed: usize,
    /// Null or missing cells passed through
    pub nulls: usize,
}

/// What a commit did
#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    /// Commit id
    pub commit_id: Uuid,
    /// Rows processed
    pub rows: usize,
    /// Per-field counts, in column order
    pub fields: Vec<FieldSummary>,
    /// Lookup records produced, if a lookup table was requested
    pub lookup_records: Option<usize>,
    /// States visited
    pub states: Vec<CommitState>,
    /// Wall-clock duration
    pub duration_ms: u64,
}

/// Successful commit output
#[derive(Debug)]
pub struct CommitOutcome {
    /// Anonymized dataset
    pub dataset: AnonymizedDataset,
    /// Lookup table, when requested
    pub lookup_table: Option<LookupTable>,
    /// Summary
    pub summary: CommitSummary,
}

/// Runs whole-dataset anonymization
pub struct CommitService {
    batch_size: usize,
    parallel: bool,
    audit: Option<Arc<AuditLogger>>,
}

impl Default for CommitService {
    fn default() -> Self {
        Self::from_config(&CommitConfig::default())
    }
}

impl CommitService {
    /// Service configured from the `[commit]` section
    pub fn from_config(config: &CommitConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            parallel: config.parallel,
            audit: None,
        }
    }

    /// Records every commit in an audit log
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Anonymizes the whole dataset
    ///
    /// # Errors
    ///
    /// [`VeilError::InvalidConfig`] or [`VeilError::UnknownTechnique`] when the
    /// config does not validate, [`VeilError::TransformFailure`] for the first
    /// failing cell.
    pub fn commit(&self, dataset: &Dataset, config: &AnonymizationConfig) -> Result<CommitOutcome> {
        self.run(dataset, config, None)
    }

    /// Like [`commit`](Self::commit), checking `cancel` before each batch
    ///
    /// Returns [`VeilError::Cancelled`] with no partial output once the flag
    /// reads `true`.
    pub fn commit_with_cancel(
        &self,
        dataset: &Dataset,
        config: &AnonymizationConfig,
        cancel: &watch::Receiver<bool>,
    ) -> Result<CommitOutcome> {
        self.run(dataset, config, Some(cancel))
    }

    fn run(
        &self,
        dataset: &Dataset,
        config: &AnonymizationConfig,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<CommitOutcome> {
        let commit_id = Uuid::new_v4();
        let started = Instant::now();
        let mut states = vec![CommitState::Validating];

        let outcome = match config.validate(dataset) {
            Ok(validated) => {
                states.push(CommitState::Transforming);
                crate::log_commit_start!(commit_id, dataset.row_count(), validated.plan.len());
                self.transform_all(commit_id, dataset, &validated, cancel)
                    .map(|(rows, generator)| (rows, generator, validated))
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok((rows, generator, validated)) => {
                states.push(CommitState::Succeeded);
                let fields: Vec<String> = validated.plan.iter().map(|p| p.field.clone()).collect();
                let lookup_table = validated.lookup.as_ref().and_then(|request| {
                    generator.finish(
                        request.file_name.clone(),
                        &validated.unique_identifier,
                        fields.clone(),
                    )
                });
                let summary = CommitSummary {
                    commit_id,
                    rows: rows.len(),
                    fields: field_summaries(dataset, &validated),
                    lookup_records: lookup_table.as_ref().map(LookupTable::len),
                    states,
                    duration_ms: started.elapsed().as_millis() as u64,
                };
                let anonymized = Dataset::new(dataset.columns().to_vec(), rows)?;

                crate::log_commit_complete!(
                    commit_id,
                    summary.rows,
                    summary.lookup_records.unwrap_or(0),
                    summary.duration_ms
                );
                if let Some(audit) = &self.audit {
                    let lookup_file = lookup_table.as_ref().map(LookupTable::file_name);
                    if let Err(e) = audit.log_commit(&summary, lookup_file) {
                        tracing::warn!(error = %e, commit_id = %commit_id, "Failed to write audit entry");
                    }
                }

                Ok(CommitOutcome {
                    dataset: AnonymizedDataset {
                        commit_id,
                        created_at: Utc::now(),
                        anonymized_fields: fields,
                        dataset: anonymized,
                    },
                    lookup_table,
                    summary,
                })
            }
            Err(e) => {
                states.push(CommitState::Failed);
                crate::log_error_with_context!(e, "commit", commit_id = %commit_id);
                if let Some(audit) = &self.audit {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    if let Err(audit_err) = audit.log_failure(commit_id, &states, &e, duration_ms) {
                        tracing::warn!(error = %audit_err, commit_id = %commit_id, "Failed to write audit entry");
                    }
                }
                Err(e)
            }
        }
    }

    fn transform_all(
        &self,
        commit_id: Uuid,
        dataset: &Dataset,
        config: &ValidatedConfig,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<(Vec<Row>, LookupGenerator)> {
        let mut generator = LookupGenerator::new(config.lookup.is_some());
        let mut rows = Vec::with_capacity(dataset.row_count());
        let total_batches = dataset.row_count().div_ceil(self.batch_size);

        for (batch_index, batch) in dataset.rows().chunks(self.batch_size).enumerate() {
            if cancel.map_or(false, |rx| *rx.borrow()) {
                generator.discard();
                tracing::warn!(
                    commit_id = %commit_id,
                    rows_processed = rows.len(),
                    "Commit cancelled"
                );
                return Err(VeilError::Cancelled {
                    rows_processed: rows.len(),
                });
            }

            let offset = batch_index * self.batch_size;
            let with_lookup = generator.is_enabled();
            let results: Vec<Result<(Row, Vec<LookupRecord>)>> = if self.parallel {
                batch
                    .par_iter()
                    .enumerate()
                    .map(|(i, row)| transform_row(offset + i, row, config, with_lookup))
                    .collect()
            } else {
                batch
                    .iter()
                    .enumerate()
                    .map(|(i, row)| transform_row(offset + i, row, config, with_lookup))
                    .collect()
            };

            for result in results {
                match result {
                    Ok((row, records)) => {
                        rows.push(row);
                        generator.extend(records);
                    }
                    Err(e) => {
                        generator.discard();
                        return Err(e);
                    }
                }
            }

            crate::log_batch_processing!(batch_index + 1, total_batches, batch.len());
        }

        Ok((rows, generator))
    }
}

/// Transforms one row; untouched columns are copied as-is
fn transform_row(
    index: usize,
    row: &Row,
    config: &ValidatedConfig,
    with_lookup: bool,
) -> Result<(Row, Vec<LookupRecord>)> {
    let row_id = row.get(&config.unique_identifier).and_then(cell_text);
    let mut output = row.clone();
    let mut pending = Vec::new();

    for plan in &config.plan {
        let Some(original) = row.get(&plan.field) else {
            continue;
        };
        let context = TransformContext::new(index, row_id.as_deref(), &plan.field, plan.pii_type);
        let anonymized = transform_field(original, plan, &context)?;
        if with_lookup {
            pending.push((plan.field.as_str(), original, anonymized.clone()));
        }
        output.insert(plan.field.clone(), anonymized);
    }

    // Join key is the identifier as it appears in the anonymized output.
    let join_key = output.get(&config.unique_identifier).and_then(cell_text);
    let records = pending
        .into_iter()
        .filter_map(|(field, original, anonymized)| {
            LookupRecord::for_cell(join_key.as_deref(), field, original, &anonymized)
        })
        .collect();
    Ok((output, records))
}

fn field_summaries(dataset: &Dataset, config: &ValidatedConfig) -> Vec<FieldSummary> {
    config
        .plan
        .iter()
        .map(|plan| {
            let transformed = dataset.non_null_count(&plan.field);
            FieldSummary {
                field: plan.field.clone(),
                technique: plan.technique.id,
                transformed,
                nulls: dataset.row_count() - transformed,
            }
        })
        .collect()
}
