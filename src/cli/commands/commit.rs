//! Commit command implementation
//!
//! Anonymizes the whole dataset, writes the result and, when the plan asks
//! for one, the lookup table. SIGINT/SIGTERM cancel the commit between
//! batches; a cancelled commit writes nothing.

use crate::anonymization::{AnonymizationConfig, CommitOutcome, VeilEngine};
use crate::cli::{exit_code, load_or_default};
use crate::domain::Dataset;
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Arguments for the commit command
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Dataset JSON document
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Anonymization plan (TOML or JSON)
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Where to write the anonymized dataset
    #[arg(short, long)]
    pub output: PathBuf,

    /// Directory for the lookup file
    #[arg(long, default_value = ".")]
    pub lookup_dir: PathBuf,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Overwrite an existing output or lookup file
    #[arg(long)]
    pub force: bool,
}

impl CommitArgs {
    /// Execute the commit command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting commit command");

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

        if let Err(e) = plan.validate(&dataset) {
            tracing::error!(error = %e, "Anonymization plan validation failed");
            eprintln!("Anonymization plan is invalid: {e}");
            return Ok(exit_code(&e));
        }

        if !self.force {
            let existing = self.existing_targets(&plan);
            for path in &existing {
                eprintln!(
                    "File already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            if !existing.is_empty() {
                return Ok(2);
            }
        }

        if !self.yes && !self.confirm(&dataset, &plan)? {
            println!("Commit cancelled.");
            return Ok(0);
        }

        let engine = VeilEngine::new(&config)?;
        println!("Anonymizing {} rows...", dataset.row_count());

        let outcome = tokio::task::spawn_blocking(move || {
            engine.commit_with_cancel(&dataset, &plan, &shutdown_signal)
        })
        .await
        .context("Commit worker panicked")?;

        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Commit failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        self.write_outputs(&outcome)?;
        Ok(0)
    }

    /// Output and lookup paths that a commit would overwrite
    fn existing_targets(&self, plan: &AnonymizationConfig) -> Vec<PathBuf> {
        let mut targets = vec![self.output.clone()];
        if plan.requires_lookup_file {
            targets.push(self.lookup_dir.join(plan.lookup_file_name.trim()));
        }
        targets.retain(|p| p.exists());
        targets
    }

    fn confirm(&self, dataset: &Dataset, plan: &AnonymizationConfig) -> anyhow::Result<bool> {
        use std::io::{self, Write};

        println!("Commit Configuration:");
        println!("  Dataset: {} ({} rows)", self.dataset.display(), dataset.row_count());
        println!("  Unique identifier: {}", plan.unique_identifier);
        for field in &plan.fields_to_anonymize {
            let technique = plan
                .technique_per_field
                .get(field)
                .map_or("-", |t| t.technique.as_str());
            println!("  {field}: {technique}");
        }
        if plan.requires_lookup_file {
            println!(
                "  Lookup file: {}",
                self.lookup_dir.join(&plan.lookup_file_name).display()
            );
        }
        println!("  Output: {}", self.output.display());
        println!();
        print!("Proceed with commit? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }

    fn write_outputs(&self, outcome: &CommitOutcome) -> anyhow::Result<()> {
        let json = outcome.dataset.dataset().to_json_pretty()?;
        write_file(&self.output, &json)?;

        let summary = &outcome.summary;
        println!();
        println!("Commit {} succeeded", summary.commit_id);
        println!("  Rows: {}", summary.rows);
        for field in &summary.fields {
            println!(
                "  {}: {} ({} transformed, {} null)",
                field.field, field.technique, field.transformed, field.nulls
            );
        }
        println!("  Output: {}", self.output.display());

        if let Some(table) = &outcome.lookup_table {
            std::fs::create_dir_all(&self.lookup_dir).with_context(|| {
                format!("Failed to create lookup directory {}", self.lookup_dir.display())
            })?;
            let path = table.write_into(&self.lookup_dir)?;
            println!("  Lookup file: {} ({} records)", path.display(), table.len());
            println!("  Store the lookup file securely; it re-identifies the dataset.");
        }
        println!("  Duration: {}ms", summary.duration_ms);
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}
