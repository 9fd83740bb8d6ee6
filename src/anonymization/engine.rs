//! Anonymization engine facade
//!
//! [`VeilEngine`] wires the classifier, preview and commit services together
//! from one [`VeilConfig`].
//!
//! # Examples
//!
//! ```no_run
//! use veil::anonymization::{AnonymizationConfig, AnonymizationOptions, VeilEngine};
//! use veil::anonymization::models::PiiOverrides;
//! use veil::anonymization::technique::TechniqueId;
//! use veil::config::VeilConfig;
//! use veil::domain::Dataset;
//!
//! # fn example() -> anyhow::Result<()> {
//! let engine = VeilEngine::new(&VeilConfig::default())?;
//! let dataset = Dataset::from_path("customers.json")?;
//!
//! let report = engine.classify(&dataset)?;
//! println!("{}", report.format_console(&PiiOverrides::default()));
//!
//! let config = AnonymizationConfig::new("customer_id")
//!     .with_field("email", TechniqueId::Hash, AnonymizationOptions::default())
//!     .with_lookup_file("customers_lookup.csv");
//! let preview = engine.preview(&dataset, &config, 5)?;
//! println!("{}", preview.format_console());
//!
//! let outcome = engine.commit(&dataset, &config)?;
//! println!("Anonymized {} rows", outcome.summary.rows);
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    audit::AuditLogger,
    classifier::PiiClassifier,
    commit::{CommitOutcome, CommitService},
    config::AnonymizationConfig,
    models::ClassificationReport,
    preview::{PreviewResult, PreviewService},
    technique::{Technique, TechniqueRegistry},
};
use crate::config::VeilConfig;
use crate::domain::{Dataset, Result};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;

/// Classify, preview and commit over one configuration
///
/// The engine holds no per-dataset state; one instance can serve many
/// datasets and be shared across threads.
pub struct VeilEngine {
    classifier: PiiClassifier,
    preview: PreviewService,
    commit: CommitService,
}

impl VeilEngine {
    /// Build an engine from the application configuration
    ///
    /// # Errors
    ///
    /// Fails when the pattern library cannot be loaded or the audit log
    /// directory cannot be created.
    pub fn new(config: &VeilConfig) -> anyhow::Result<Self> {
        let classifier = PiiClassifier::from_config(&config.classifier)
            .context("Failed to build PII classifier")?;

        let mut commit = CommitService::from_config(&config.commit);
        if config.audit.enabled {
            let audit = AuditLogger::from_config(&config.audit)
                .context("Failed to initialize audit logger")?;
            commit = commit.with_audit(Arc::new(audit));
        }

        tracing::debug!(
            sample_rows = config.classifier.sample_rows,
            batch_size = config.commit.batch_size,
            parallel = config.commit.parallel,
            audit = config.audit.enabled,
            "Veil engine initialized"
        );

        Ok(Self {
            classifier,
            preview: PreviewService::from_config(&config.preview),
            commit,
        })
    }

    /// Technique catalogue
    pub fn techniques(&self) -> &'static [Technique] {
        TechniqueRegistry::list()
    }

    /// Classify every column of `dataset`
    pub fn classify(&self, dataset: &Dataset) -> Result<ClassificationReport> {
        self.classifier.classify(dataset)
    }

    /// Preview `config` on up to `sample_size` rows (0 uses the configured default)
    pub fn preview(
        &self,
        dataset: &Dataset,
        config: &AnonymizationConfig,
        sample_size: usize,
    ) -> Result<PreviewResult> {
        self.preview.preview(dataset, config, sample_size)
    }

    /// Anonymize the whole dataset
    pub fn commit(&self, dataset: &Dataset, config: &AnonymizationConfig) -> Result<CommitOutcome> {
        self.commit.commit(dataset, config)
    }

    /// Anonymize the whole dataset, stopping when `cancel` turns `true`
    pub fn commit_with_cancel(
        &self,
        dataset: &Dataset,
        config: &AnonymizationConfig,
        cancel: &watch::Receiver<bool>,
    ) -> Result<CommitOutcome> {
        self.commit.commit_with_cancel(dataset, config, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::technique::TechniqueId;
    use crate::domain::{Column, ColumnType, VeilError};
    use serde_json::json;

    fn engine() -> VeilEngine {
        let mut config = VeilConfig::default();
        config.audit.enabled = false;
        VeilEngine::new(&config).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Column::new("id", ColumnType::Identifier),
                Column::new("email", ColumnType::Email),
            ],
            vec![
                json!({"id": "c-1", "email": "jane@example.com"})
                    .as_object()
                    .cloned()
                    .unwrap(),
                json!({"id": "c-2", "email": null}).as_object().cloned().unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_engine_pipeline() {
        let engine = engine();
        let dataset = dataset();

        let report = engine.classify(&dataset).unwrap();
        assert!(report.get("email").unwrap().is_pii);

        let config = AnonymizationConfig::new("id").with_field(
            "email",
            TechniqueId::Mask,
            Default::default(),
        );
        let preview = engine.preview(&dataset, &config, 0).unwrap();
        assert_eq!(preview.summary.total_columns_anonymized, 1);

        let outcome = engine.commit(&dataset, &config).unwrap();
        let rows = outcome.dataset.dataset().rows();
        assert_eq!(rows[0]["email"], json!("ja****om"));
        assert!(rows[1]["email"].is_null());
        assert!(outcome.lookup_table.is_none());
    }

    #[test]
    fn test_engine_rejects_unknown_technique() {
        let engine = engine();
        let mut config = AnonymizationConfig::new("id");
        config.fields_to_anonymize.insert("email".to_string());
        config.technique_per_field.insert(
            "email".to_string(),
            crate::anonymization::config::FieldTechnique {
                technique: "scramble".to_string(),
                options: Default::default(),
            },
        );
        assert!(matches!(
            engine.commit(&dataset(), &config),
            Err(VeilError::UnknownTechnique(_))
        ));
    }

    #[test]
    fn test_techniques_catalogue() {
        assert_eq!(engine().techniques().len(), 8);
    }
}
