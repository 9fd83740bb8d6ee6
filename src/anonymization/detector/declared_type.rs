//! Declared-type detector

use super::{Candidate, ColumnSample, PiiDetector};
use crate::anonymization::models::{DetectionMethod, PiiType};
use crate::domain::ColumnType;

/// Trusts the semantic type the ingestion side declared for the column
pub struct DeclaredTypeDetector;

impl PiiDetector for DeclaredTypeDetector {
    fn name(&self) -> &'static str {
        "declared_type"
    }

    fn detect(&self, sample: &ColumnSample<'_>) -> Option<Candidate> {
        let (pii_type, score) = match sample.column.column_type {
            ColumnType::Email => (PiiType::Email, 0.7),
            ColumnType::Phone => (PiiType::Phone, 0.7),
            ColumnType::Name => (PiiType::Name, 0.7),
            ColumnType::Address => (PiiType::Address, 0.7),
            ColumnType::Identifier => (PiiType::Identifier, 0.5),
            // Plenty of dates are not personal; leave them below threshold.
            ColumnType::Date => (PiiType::Date, 0.3),
            ColumnType::Text | ColumnType::Numeric => return None,
        };
        Some(Candidate::new(pii_type, score, DetectionMethod::DeclaredType))
    }
}
