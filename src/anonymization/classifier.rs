//! PII classifier
//!
//! Samples the first `sample_rows` rows of a dataset and runs every detector
//! over each column. The best-scoring candidate becomes the column's
//! classification; `is_pii` holds when its confidence reaches the threshold or
//! the column name is a high-risk keyword. A column with no usable values is
//! reported with confidence 0 and `is_pii = false`.
//!
//! Classification is deterministic: the same rows and detector set always
//! produce the same report.

use crate::anonymization::detector::{
    Candidate, CardinalityDetector, ColumnNameDetector, ColumnSample, DeclaredTypeDetector,
    PatternRegistry, PiiDetector, RegexDetector,
};
use crate::anonymization::models::{ClassificationReport, PiiClassification};
use crate::anonymization::transform::masking::mask;
use crate::config::ClassifierConfig;
use crate::domain::{cell_text, Dataset, Result, VeilError};
use chrono::Utc;

/// Masked examples kept per column
pub const MAX_EXAMPLES: usize = 3;

/// Column classifier built from a detector set
pub struct PiiClassifier {
    detectors: Vec<Box<dyn PiiDetector>>,
    sample_rows: usize,
    confidence_threshold: f32,
}

impl PiiClassifier {
    /// Classifier with built-in patterns and default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(&ClassifierConfig::default())
    }

    /// Classifier configured from the `[classifier]` section
    pub fn from_config(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let registry = match &config.pattern_library {
            Some(path) => PatternRegistry::from_file(path)?,
            None => PatternRegistry::default_patterns()?,
        };
        let detectors: Vec<Box<dyn PiiDetector>> = vec![
            Box::new(RegexDetector::with_registry(registry)),
            Box::new(DeclaredTypeDetector),
            Box::new(ColumnNameDetector::with_high_risk_keywords(
                config.high_risk_keywords.iter().cloned(),
            )),
            Box::new(CardinalityDetector),
        ];
        Ok(Self::with_detectors(
            detectors,
            config.sample_rows,
            config.confidence_threshold,
        ))
    }

    /// Classifier with an explicit detector set, in priority order for ties
    pub fn with_detectors(
        detectors: Vec<Box<dyn PiiDetector>>,
        sample_rows: usize,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            detectors,
            sample_rows: sample_rows.max(1),
            confidence_threshold: confidence_threshold.clamp(0.0, 1.0),
        }
    }

    /// Threshold applied to derive `is_pii`
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Classifies every column of a dataset
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::ClassificationFailure`] only for a dataset without
    /// columns. Malformed or null cells are skipped.
    pub fn classify(&self, dataset: &Dataset) -> Result<ClassificationReport> {
        if dataset.columns().is_empty() {
            return Err(VeilError::ClassificationFailure(
                "dataset has no columns".to_string(),
            ));
        }

        let rows = &dataset.rows()[..dataset.row_count().min(self.sample_rows)];
        tracing::debug!(
            columns = dataset.columns().len(),
            rows_sampled = rows.len(),
            "Classifying dataset"
        );

        let mut classifications = Vec::with_capacity(dataset.columns().len());
        for column in dataset.columns() {
            let values: Vec<String> = rows
                .iter()
                .filter_map(|row| row.get(&column.name).and_then(cell_text))
                .filter(|v| !v.trim().is_empty())
                .collect();
            let sample = ColumnSample {
                column,
                values,
                rows_sampled: rows.len(),
            };
            classifications.push(self.classify_column(&sample));
        }

        let recommendations = recommendations(&classifications);
        let flagged = classifications.iter().filter(|c| c.is_pii).count();
        tracing::info!(
            columns = classifications.len(),
            pii_columns = flagged,
            rows_sampled = rows.len(),
            "Classification complete"
        );

        Ok(ClassificationReport {
            classifications,
            recommendations,
            rows_sampled: rows.len(),
            confidence_threshold: self.confidence_threshold,
            generated_at: Utc::now(),
        })
    }

    fn classify_column(&self, sample: &ColumnSample<'_>) -> PiiClassification {
        let mut classification = PiiClassification::empty(sample.column.name.clone());
        if sample.values.is_empty() {
            return classification;
        }

        let mut best: Option<Candidate> = None;
        let mut high_risk = false;
        for detector in &self.detectors {
            let Some(candidate) = detector.detect(sample) else {
                continue;
            };
            tracing::trace!(
                column = %sample.column.name,
                detector = detector.name(),
                pii_type = %candidate.pii_type,
                score = candidate.score,
                "Detector candidate"
            );
            high_risk |= candidate.high_risk;
            if best.map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        if let Some(best) = best {
            classification.pii_type = best.pii_type;
            classification.confidence = best.score;
            classification.detection_method = Some(best.method);
            classification.is_pii = best.score >= self.confidence_threshold || high_risk;
        }
        classification.sampled_values = sample.values.len();

        let mut examples: Vec<String> = Vec::new();
        for value in &sample.values {
            let masked = mask(value);
            if !examples.contains(&masked) {
                examples.push(masked);
            }
            if examples.len() == MAX_EXAMPLES {
                break;
            }
        }
        classification.examples = examples;
        classification
    }
}

fn recommendations(classifications: &[PiiClassification]) -> Vec<String> {
    let mut recommendations: Vec<String> = classifications
        .iter()
        .filter(|c| c.is_pii)
        .map(|c| {
            format!(
                "Consider anonymizing column '{}' ({}% confidence, detected as {}); suggested technique: {}",
                c.column,
                c.confidence_pct(),
                c.pii_type,
                c.pii_type.suggested_technique()
            )
        })
        .collect();

    if recommendations.is_empty() {
        recommendations.push("No PII detected in the sampled rows".to_string());
    } else {
        recommendations.push(
            "Select a unique identifier column before requesting a lookup file".to_string(),
        );
    }
    recommendations
}
