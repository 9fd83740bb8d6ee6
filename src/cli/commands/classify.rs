//! Classify command implementation
//!
//! Runs the PII classifier over a dataset and prints the report. With
//! `--plan-out` it also writes a starter anonymization plan selecting every
//! flagged column with its suggested technique.

use crate::anonymization::models::{ClassificationReport, PiiOverrides};
use crate::anonymization::{ConfigBuilder, PiiClassifier};
use crate::cli::{exit_code, load_or_default, OutputFormat};
use crate::domain::Dataset;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Dataset JSON document
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Override the number of rows sampled
    #[arg(long)]
    pub sample_rows: Option<usize>,

    /// Columns to treat as not PII (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub not_pii: Vec<String>,

    /// Write a starter anonymization plan (TOML) to this path
    #[arg(long)]
    pub plan_out: Option<PathBuf>,

    /// Unique identifier column for the starter plan
    #[arg(long, requires = "plan_out")]
    pub unique_identifier: Option<String>,
}

impl ClassifyArgs {
    /// Execute the classify command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(dataset = %self.dataset.display(), "Starting classify command");

        let mut config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        if let Some(rows) = self.sample_rows {
            config.classifier.sample_rows = rows;
        }

        let dataset = match Dataset::from_path(&self.dataset) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Failed to load dataset: {e}");
                return Ok(exit_code(&e));
            }
        };

        let classifier = PiiClassifier::from_config(&config.classifier)?;
        let report = match classifier.classify(&dataset) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Classification failed");
                eprintln!("Classification failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        let mut overrides = PiiOverrides::new();
        for column in self.not_pii.iter().map(|c| c.trim()) {
            if dataset.has_column(column) {
                overrides.mark_not_pii(column);
            } else {
                tracing::warn!(column = %column, "Ignoring override for unknown column");
            }
        }

        match self.format {
            OutputFormat::Text => println!("{}", report.format_console(&overrides)),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            ),
        }

        if let Some(path) = &self.plan_out {
            let plan = match self.starter_plan(&dataset, &report, &overrides) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to build plan: {e}");
                    return Ok(exit_code(&e));
                }
            };
            std::fs::write(path, plan)
                .with_context(|| format!("Failed to write plan {}", path.display()))?;
            eprintln!("Starter plan written to {}", path.display());
        }

        Ok(0)
    }

    fn starter_plan(
        &self,
        dataset: &Dataset,
        report: &ClassificationReport,
        overrides: &PiiOverrides,
    ) -> crate::domain::Result<String> {
        let mut builder = ConfigBuilder::new(dataset).with_classification(report.clone());
        if let Some(uid) = &self.unique_identifier {
            builder.set_unique_identifier(uid)?;
        }
        for classification in report.pii_columns(overrides) {
            builder.toggle_field(&classification.column)?;
        }

        let outstanding = builder.issues();
        for issue in &outstanding {
            tracing::info!(issue = %issue, "Starter plan needs attention");
        }
        let plan = toml::to_string_pretty(&builder.build())
            .map_err(|e| crate::domain::VeilError::Serialization(e.to_string()))?;
        Ok(plan)
    }
}
