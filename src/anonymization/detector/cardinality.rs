//! Cardinality heuristic for identifier-like columns

use super::{Candidate, ColumnSample, PiiDetector};
use crate::anonymization::models::{DetectionMethod, PiiType};
use std::collections::HashSet;

/// Fewer values than this say nothing about uniqueness
pub const MIN_VALUES: usize = 10;
/// Distinct-to-value ratio at which a column looks like an identifier
pub const MIN_RATIO: f32 = 0.9;
const WEIGHT: f32 = 0.6;

/// Flags near-unique, whitespace-free columns as identifiers
pub struct CardinalityDetector;

impl PiiDetector for CardinalityDetector {
    fn name(&self) -> &'static str {
        "cardinality"
    }

    fn detect(&self, sample: &ColumnSample<'_>) -> Option<Candidate> {
        if sample.values.len() < MIN_VALUES {
            return None;
        }
        // Free text is near-unique too.
        if sample.values.iter().any(|v| v.trim().contains(char::is_whitespace)) {
            return None;
        }

        let distinct: HashSet<&str> = sample.values.iter().map(String::as_str).collect();
        let ratio = distinct.len() as f32 / sample.values.len() as f32;
        (ratio >= MIN_RATIO)
            .then(|| Candidate::new(PiiType::Identifier, WEIGHT * ratio, DetectionMethod::Cardinality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnType};

    fn detect(values: Vec<String>) -> Option<Candidate> {
        let column = Column::new("ref", ColumnType::Text);
        CardinalityDetector.detect(&ColumnSample {
            column: &column,
            rows_sampled: values.len(),
            values,
        })
    }

    #[test]
    fn test_unique_codes_look_like_identifiers() {
        let values = (0..20).map(|i| format!("AC-{i:04}")).collect();
        let candidate = detect(values).unwrap();
        assert_eq!(candidate.pii_type, PiiType::Identifier);
        assert!((candidate.score - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_low_cardinality_and_small_samples_ignored() {
        let repeated = (0..20).map(|i| format!("{}", i % 3)).collect();
        assert!(detect(repeated).is_none());
        let few = (0..5).map(|i| i.to_string()).collect();
        assert!(detect(few).is_none());
        let prose = (0..20).map(|i| format!("note number {i}")).collect();
        assert!(detect(prose).is_none());
    }
}
