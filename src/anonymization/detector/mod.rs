//! PII detection module
//!
//! Every detector looks at one column sample independently and may propose a
//! single `(type, score)` candidate. The classifier keeps the best candidate.

pub mod cardinality;
pub mod column_name;
pub mod declared_type;
pub mod patterns;
pub mod regex;

pub use cardinality::CardinalityDetector;
pub use column_name::ColumnNameDetector;
pub use declared_type::DeclaredTypeDetector;
pub use patterns::PatternRegistry;
pub use regex::RegexDetector;

use crate::anonymization::models::{DetectionMethod, PiiType};
use crate::domain::Column;

/// Usable values of one column, taken from the sampled rows
#[derive(Debug, Clone)]
pub struct ColumnSample<'a> {
    /// Column metadata
    pub column: &'a Column,
    /// Non-null, non-blank values in row order
    pub values: Vec<String>,
    /// Rows inspected, including rows where the column was null
    pub rows_sampled: usize,
}

/// A detector's proposal for a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Proposed PII type
    pub pii_type: PiiType,
    /// Score in 0.0..=1.0
    pub score: f32,
    /// Detector that produced it
    pub method: DetectionMethod,
    /// Column name hit a high-risk keyword; forces `is_pii`
    pub high_risk: bool,
}

impl Candidate {
    /// Ordinary candidate
    pub fn new(pii_type: PiiType, score: f32, method: DetectionMethod) -> Self {
        Self {
            pii_type,
            score: score.clamp(0.0, 1.0),
            method,
            high_risk: false,
        }
    }
}

/// Trait for PII detection implementations
pub trait PiiDetector: Send + Sync {
    /// Detector name for logs
    fn name(&self) -> &'static str;

    /// Inspect a column sample; `None` when there is nothing to report
    fn detect(&self, sample: &ColumnSample<'_>) -> Option<Candidate>;
}
