//! Value-pattern detector
//!
//! Each library entry scores `confidence * matched / sampled`; the best entry
//! wins, ties going to the entry first in name order.

use super::{patterns::PatternRegistry, Candidate, ColumnSample, PiiDetector};
use crate::anonymization::models::DetectionMethod;
use std::sync::Arc;

/// Scores sampled values against the pattern library
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
}

impl RegexDetector {
    /// Detector over the built-in library
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_registry(PatternRegistry::default_patterns()?))
    }

    /// Detector over a custom library
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
        }
    }
}

impl PiiDetector for RegexDetector {
    fn name(&self) -> &'static str {
        "value_pattern"
    }

    fn detect(&self, sample: &ColumnSample<'_>) -> Option<Candidate> {
        if sample.values.is_empty() {
            return None;
        }

        let mut best: Option<Candidate> = None;
        for entry in self.pattern_registry.entries() {
            let matched = sample.values.iter().filter(|v| entry.matches(v)).count();
            if matched == 0 {
                continue;
            }
            let score = entry.confidence * matched as f32 / sample.values.len() as f32;
            if best.map_or(true, |b| score > b.score) {
                best = Some(Candidate::new(entry.pii_type, score, DetectionMethod::ValuePattern));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::PiiType;
    use crate::domain::{Column, ColumnType};

    fn sample<'a>(column: &'a Column, values: &[&str]) -> ColumnSample<'a> {
        ColumnSample {
            column,
            values: values.iter().map(|v| v.to_string()).collect(),
            rows_sampled: values.len(),
        }
    }

    #[test]
    fn test_email_column() {
        let detector = RegexDetector::new().unwrap();
        let column = Column::new("contact", ColumnType::Text);
        let candidate = detector
            .detect(&sample(&column, &["a@example.com", "b@example.org"]))
            .unwrap();
        assert_eq!(candidate.pii_type, PiiType::Email);
        assert!(candidate.score >= 0.9);
    }

    #[test]
    fn test_partial_match_scales_score() {
        let detector = RegexDetector::new().unwrap();
        let column = Column::new("contact", ColumnType::Text);
        let candidate = detector
            .detect(&sample(&column, &["a@example.com", "n/a", "none", "unknown"]))
            .unwrap();
        assert_eq!(candidate.pii_type, PiiType::Email);
        assert!(candidate.score < 0.3);
    }

    #[test]
    fn test_no_match() {
        let detector = RegexDetector::new().unwrap();
        let column = Column::new("notes", ColumnType::Text);
        assert!(detector
            .detect(&sample(&column, &["hello world", "lorem ipsum"]))
            .is_none());
        assert!(detector.detect(&sample(&column, &[])).is_none());
    }
}
