//! Preview service
//!
//! Runs the transform engine over a small sample so the operator can review
//! original/anonymized pairs before committing. Preview reads the dataset and
//! never writes to it or to any lookup storage. A cell that fails to transform
//! becomes a warning instead of failing the preview.

use crate::anonymization::config::{AnonymizationConfig, ValidatedConfig};
use crate::anonymization::technique::{TechniqueCategory, TechniqueId};
use crate::anonymization::transform::{transform_field, TransformContext};
use crate::config::PreviewConfig;
use crate::domain::{cell_text, Dataset, Result, Row};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One original/anonymized pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSample {
    /// Zero-based source row index
    pub row: usize,
    /// Column name
    pub column: String,
    /// Source value
    pub original: Value,
    /// Transformed value; null when the transform failed
    pub anonymized: Value,
    /// Technique applied
    pub technique: TechniqueId,
    /// Failure reason, if the transform failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts describing the configured plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewSummary {
    /// Fields the plan anonymizes
    pub total_columns_anonymized: usize,
    /// Fields per technique
    pub per_technique: BTreeMap<TechniqueId, usize>,
    /// Fields per technique category
    pub per_category: BTreeMap<TechniqueCategory, usize>,
    /// Distinct reversible techniques in use
    pub reversible_in_use: usize,
}

/// Preview output; ephemeral and never persisted by the engine
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResult {
    /// Source rows shown
    pub rows: Vec<usize>,
    /// Pairs in row, then column order
    pub samples: Vec<PreviewSample>,
    /// Plan summary
    pub summary: PreviewSummary,
    /// Per-cell failures and other operator warnings
    pub warnings: Vec<String>,
}

impl PreviewResult {
    /// Format preview for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                   ANONYMIZATION PREVIEW                       \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n\n");

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "  Columns Anonymized:          {}\n",
            self.summary.total_columns_anonymized
        ));
        output.push_str(&format!(
            "  Reversible Techniques:       {}\n",
            self.summary.reversible_in_use
        ));
        for (technique, count) in &self.summary.per_technique {
            output.push_str(&format!("  {:28} {:>5}\n", technique.to_string(), count));
        }
        output.push('\n');

        if !self.samples.is_empty() {
            output.push_str("📝 SAMPLE ANONYMIZATIONS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            let mut current_row = None;
            for sample in &self.samples {
                if current_row != Some(sample.row) {
                    output.push_str(&format!("\n  Row #{}\n", sample.row + 1));
                    current_row = Some(sample.row);
                }
                let anonymized = match &sample.error {
                    Some(_) => "<failed>".to_string(),
                    None => display(&sample.anonymized),
                };
                output.push_str(&format!(
                    "    {:20} {:12} {} → {}\n",
                    sample.column,
                    sample.technique.to_string(),
                    display(&sample.original),
                    anonymized
                ));
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format preview as JSON
    pub fn format_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn display(value: &Value) -> String {
    match cell_text(value) {
        Some(text) => format!("\"{text}\""),
        None => "null".to_string(),
    }
}

/// Read-only sampling over the transform engine
#[derive(Debug, Clone)]
pub struct PreviewService {
    default_sample_size: usize,
    max_sample_size: usize,
}

impl Default for PreviewService {
    fn default() -> Self {
        Self::from_config(&PreviewConfig::default())
    }
}

impl PreviewService {
    /// Service configured from the `[preview]` section
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            default_sample_size: config.sample_size,
            max_sample_size: config.max_sample_size.max(1),
        }
    }

    /// Validates `config` against `dataset` and previews up to `sample_size` rows
    ///
    /// A `sample_size` of 0 uses the configured default.
    pub fn preview(
        &self,
        dataset: &Dataset,
        config: &AnonymizationConfig,
        sample_size: usize,
    ) -> Result<PreviewResult> {
        let validated = config.validate(dataset)?;
        Ok(self.preview_validated(dataset, &validated, sample_size))
    }

    /// Previews an already validated config
    pub fn preview_validated(
        &self,
        dataset: &Dataset,
        config: &ValidatedConfig,
        sample_size: usize,
    ) -> PreviewResult {
        let requested = if sample_size == 0 {
            self.default_sample_size
        } else {
            sample_size
        };
        let limit = requested.min(self.max_sample_size);
        let rows = select_rows(dataset, config, limit);

        let mut samples = Vec::new();
        let mut warnings = Vec::new();
        for &index in &rows {
            let row = &dataset.rows()[index];
            let row_id = row.get(&config.unique_identifier).and_then(cell_text);
            for plan in &config.plan {
                let original = row.get(&plan.field).cloned().unwrap_or(Value::Null);
                let context =
                    TransformContext::new(index, row_id.as_deref(), &plan.field, plan.pii_type);
                let (anonymized, error) = match transform_field(&original, plan, &context) {
                    Ok(value) => (value, None),
                    Err(e) => {
                        warnings.push(e.to_string());
                        (Value::Null, Some(e.to_string()))
                    }
                };
                samples.push(PreviewSample {
                    row: index,
                    column: plan.field.clone(),
                    original,
                    anonymized,
                    technique: plan.technique.id,
                    error,
                });
            }
        }

        warnings.extend(plan_warnings(config));
        tracing::debug!(
            rows = rows.len(),
            samples = samples.len(),
            warnings = warnings.len(),
            "Preview generated"
        );

        PreviewResult {
            rows,
            samples,
            summary: summarize(config),
            warnings,
        }
    }
}

fn has_selected_value(row: &Row, config: &ValidatedConfig) -> bool {
    config
        .plan
        .iter()
        .any(|p| row.get(&p.field).map_or(false, |v| !v.is_null()))
}

/// First `limit` rows holding a value in an anonymized field, else the first `limit` rows
fn select_rows(dataset: &Dataset, config: &ValidatedConfig, limit: usize) -> Vec<usize> {
    let qualifying: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| has_selected_value(row, config))
        .map(|(i, _)| i)
        .take(limit)
        .collect();
    if qualifying.is_empty() {
        (0..dataset.row_count().min(limit)).collect()
    } else {
        qualifying
    }
}

/// Plan summary; depends only on the validated config
pub fn summarize(config: &ValidatedConfig) -> PreviewSummary {
    let mut summary = PreviewSummary {
        total_columns_anonymized: config.plan.len(),
        ..PreviewSummary::default()
    };
    let mut reversible = Vec::new();
    for plan in &config.plan {
        *summary.per_technique.entry(plan.technique.id).or_default() += 1;
        *summary.per_category.entry(plan.technique.category).or_default() += 1;
        if plan.technique.reversible && !reversible.contains(&plan.technique.id) {
            reversible.push(plan.technique.id);
        }
    }
    summary.reversible_in_use = reversible.len();
    summary
}

fn plan_warnings(config: &ValidatedConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.lookup.is_some() {
        warnings.push(
            "The lookup table maps anonymized values back to originals; store it as securely as the source data"
                .to_string(),
        );
    }
    if let Some(plan) = config.field(&config.unique_identifier) {
        if !plan.technique.deterministic {
            warnings.push(format!(
                "Unique identifier '{}' uses non-deterministic technique '{}'; joins against other datasets will break",
                config.unique_identifier, plan.technique.id
            ));
        }
    }
    warnings
}
