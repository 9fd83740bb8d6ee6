//! Transform engine
//!
//! Maps one cell value to its anonymized form. Each technique category has a
//! single [`Transformer`] implementation selected by [`TechniqueCategory`], so
//! the per-cell path never does a string lookup.
//!
//! Null and empty-string inputs pass through unchanged for every technique.
//! Non-string scalars are anonymized through their textual form and come back
//! as JSON strings.

pub mod encryption;
pub mod generalization;
pub mod hashing;
pub mod masking;
pub mod removal;
pub mod substitution;

use crate::anonymization::config::{AnonymizationOptions, FieldPlan};
use crate::anonymization::models::PiiType;
use crate::anonymization::technique::{Technique, TechniqueCategory};
use crate::domain::{cell_text, ConfigViolation, Result, VeilError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Per-cell context
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Zero-based row index in the source dataset
    pub row_index: usize,
    /// Unique-identifier value of the row, if present
    pub row_id: Option<&'a str>,
    /// Column being anonymized
    pub field: &'a str,
    /// PII type used by substitution and redaction
    pub pii_type: PiiType,
}

impl<'a> TransformContext<'a> {
    /// Context for a cell
    pub fn new(row_index: usize, row_id: Option<&'a str>, field: &'a str, pii_type: PiiType) -> Self {
        Self {
            row_index,
            row_id,
            field,
            pii_type,
        }
    }

    /// Random generator seeded from (technique, row id, field, value)
    ///
    /// The same logical cell always yields the same generator, so preview and
    /// commit agree. Without a row id the generator is seeded from entropy.
    pub fn rng(&self, technique: &Technique, value: &str) -> StdRng {
        let Some(row_id) = self.row_id else {
            return StdRng::from_entropy();
        };
        let mut hasher = Sha256::new();
        for part in [technique.id.as_str(), row_id, self.field, value] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        StdRng::from_seed(hasher.finalize().into())
    }
}

/// Input handed to a transformer for one non-empty cell
pub struct CellInput<'a> {
    /// Textual cell value, never empty
    pub value: &'a str,
    /// Technique being applied
    pub technique: &'static Technique,
    /// Field options
    pub options: &'a AnonymizationOptions,
    /// Compiled masking pattern
    pub mask_pattern: Option<&'a Regex>,
    /// Cell context
    pub context: &'a TransformContext<'a>,
}

/// One implementation per technique category
pub trait Transformer: Send + Sync {
    /// Produces the anonymized text, or a failure reason
    fn apply(&self, input: &CellInput<'_>) -> std::result::Result<String, String>;
}

/// Transformer for a category
pub fn transformer(category: TechniqueCategory) -> &'static dyn Transformer {
    match category {
        TechniqueCategory::Masking => &masking::Masking,
        TechniqueCategory::Hashing => &hashing::Hashing,
        TechniqueCategory::Substitution => &substitution::Substitution,
        TechniqueCategory::Encryption => &encryption::Encryption,
        TechniqueCategory::Generalization => &generalization::Generalization,
        TechniqueCategory::Removal => &removal::Removal,
    }
}

/// Anonymizes one value
///
/// # Errors
///
/// Returns [`VeilError::TransformFailure`] naming the row, field and technique
/// when the technique cannot handle the value, or [`VeilError::InvalidConfig`]
/// for an uncompilable mask pattern.
pub fn transform(
    value: &Value,
    technique: &'static Technique,
    options: &AnonymizationOptions,
    context: &TransformContext<'_>,
) -> Result<Value> {
    let mask_pattern = match &options.custom_pattern {
        Some(p) if technique.category == TechniqueCategory::Masking => {
            Some(Regex::new(p).map_err(|e| ConfigViolation::InvalidMaskPattern {
                field: context.field.to_string(),
                reason: e.to_string(),
            })?)
        }
        _ => None,
    };
    apply(value, technique, options, mask_pattern.as_ref(), context)
}

/// Anonymizes one value according to a validated field plan
pub fn transform_field(value: &Value, plan: &FieldPlan, context: &TransformContext<'_>) -> Result<Value> {
    apply(
        value,
        plan.technique,
        &plan.options,
        plan.mask_pattern.as_ref(),
        context,
    )
}

fn apply(
    value: &Value,
    technique: &'static Technique,
    options: &AnonymizationOptions,
    mask_pattern: Option<&Regex>,
    context: &TransformContext<'_>,
) -> Result<Value> {
    let Some(text) = cell_text(value) else {
        return Ok(Value::Null);
    };
    if text.is_empty() {
        return Ok(value.clone());
    }

    let input = CellInput {
        value: &text,
        technique,
        options,
        mask_pattern,
        context,
    };
    transformer(technique.category)
        .apply(&input)
        .map(Value::String)
        .map_err(|reason| {
            VeilError::transform(context.row_index, context.field, technique.id.as_str(), reason)
        })
}
