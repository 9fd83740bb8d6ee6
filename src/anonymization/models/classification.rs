//! PII classification data models

use crate::anonymization::technique::TechniqueId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of personal data a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    /// Names (first, middle, last, full)
    Name,
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// Social Security Numbers and similar national numbers
    Ssn,
    /// Street address, city, county
    Address,
    /// ZIP / postal codes
    PostalCode,
    /// Payment card numbers
    CreditCard,
    /// IP addresses
    IpAddress,
    /// Web URLs
    Url,
    /// Dates of birth and other personal dates
    Date,
    /// Record or account identifiers
    Identifier,
    /// Anything else worth protecting
    Generic,
}

impl PiiType {
    /// Upper-case label used in tokens and redaction markers
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "PERSON",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Ssn => "SSN",
            Self::Address => "LOCATION",
            Self::PostalCode => "POSTAL_CODE",
            Self::CreditCard => "CREDIT_CARD",
            Self::IpAddress => "IP_ADDRESS",
            Self::Url => "URL",
            Self::Date => "DATE",
            Self::Identifier => "IDENTIFIER",
            Self::Generic => "PII",
        }
    }

    /// Technique offered by default when the operator selects the column
    pub fn suggested_technique(&self) -> TechniqueId {
        match self {
            Self::Name | Self::Email | Self::Phone | Self::Address => TechniqueId::Substitute,
            Self::Ssn | Self::CreditCard => TechniqueId::Mask,
            Self::PostalCode | Self::Date => TechniqueId::Generalize,
            Self::IpAddress | Self::Url | Self::Identifier => TechniqueId::Hash,
            Self::Generic => TechniqueId::Mask,
        }
    }

    /// Parses a pattern-library category label
    pub fn parse_label(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NAME" | "PERSON" => Some(Self::Name),
            "EMAIL" => Some(Self::Email),
            "PHONE" => Some(Self::Phone),
            "SSN" => Some(Self::Ssn),
            "ADDRESS" | "LOCATION" => Some(Self::Address),
            "POSTAL_CODE" | "ZIP" => Some(Self::PostalCode),
            "CREDIT_CARD" => Some(Self::CreditCard),
            "IP_ADDRESS" => Some(Self::IpAddress),
            "URL" => Some(Self::Url),
            "DATE" => Some(Self::Date),
            "IDENTIFIER" => Some(Self::Identifier),
            "GENERIC" | "PII" => Some(Self::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Ssn => "ssn",
            Self::Address => "address",
            Self::PostalCode => "postal_code",
            Self::CreditCard => "credit_card",
            Self::IpAddress => "ip_address",
            Self::Url => "url",
            Self::Date => "date",
            Self::Identifier => "identifier",
            Self::Generic => "generic",
        };
        write!(f, "{s}")
    }
}

/// Detector that produced the winning candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Regex match against sampled values
    ValuePattern,
    /// Column-name keyword heuristic
    ColumnName,
    /// Declared semantic type of the column
    DeclaredType,
    /// Distinct-to-row ratio heuristic
    Cardinality,
}

/// Per-column PII classification
///
/// Immutable once produced by the classifier; operator overrides live in
/// [`PiiOverrides`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiClassification {
    /// Column name
    pub column: String,
    /// Most likely kind of PII
    pub pii_type: PiiType,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Whether the column is considered PII
    pub is_pii: bool,
    /// Detector behind the winning candidate
    pub detection_method: Option<DetectionMethod>,
    /// Masked example values
    pub examples: Vec<String>,
    /// Non-null values inspected
    pub sampled_values: usize,
}

impl PiiClassification {
    /// Classification for a column with nothing to go on
    pub fn empty(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            pii_type: PiiType::Generic,
            confidence: 0.0,
            is_pii: false,
            detection_method: None,
            examples: Vec::new(),
            sampled_values: 0,
        }
    }

    /// Confidence as a whole percentage
    pub fn confidence_pct(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// Classification results for one dataset snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// One entry per dataset column, in column order
    pub classifications: Vec<PiiClassification>,
    /// Operator-facing suggestions
    pub recommendations: Vec<String>,
    /// Rows inspected
    pub rows_sampled: usize,
    /// Threshold applied to derive `is_pii`
    pub confidence_threshold: f32,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl ClassificationReport {
    /// Classification for a column
    pub fn get(&self, column: &str) -> Option<&PiiClassification> {
        self.classifications.iter().find(|c| c.column == column)
    }

    /// Detector verdict with the operator's overrides layered on top
    pub fn effective_is_pii(&self, column: &str, overrides: &PiiOverrides) -> bool {
        if overrides.is_overridden(column) {
            return false;
        }
        self.get(column).map_or(false, |c| c.is_pii)
    }

    /// Columns still considered PII after overrides, in column order
    pub fn pii_columns(&self, overrides: &PiiOverrides) -> Vec<&PiiClassification> {
        self.classifications
            .iter()
            .filter(|c| c.is_pii && !overrides.is_overridden(&c.column))
            .collect()
    }

    /// Format report for console output
    pub fn format_console(&self, overrides: &PiiOverrides) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                   PII CLASSIFICATION REPORT                   \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n\n");
        output.push_str(&format!("  Rows Sampled:          {}\n", self.rows_sampled));
        output.push_str(&format!(
            "  Confidence Threshold:  {:.0}%\n\n",
            self.confidence_threshold * 100.0
        ));

        output.push_str(&format!(
            "  {:24} {:12} {:>10}  {}\n",
            "COLUMN", "TYPE", "CONFIDENCE", "PII"
        ));
        output.push_str("───────────────────────────────────────────────────────────────\n");
        for c in &self.classifications {
            let verdict = if overrides.is_overridden(&c.column) {
                "no (override)"
            } else if c.is_pii {
                "yes"
            } else {
                "no"
            };
            output.push_str(&format!(
                "  {:24} {:12} {:>9}%  {}\n",
                c.column,
                c.pii_type.to_string(),
                c.confidence_pct(),
                verdict
            ));
        }

        if !self.recommendations.is_empty() {
            output.push_str("\n💡 RECOMMENDATIONS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for rec in &self.recommendations {
                output.push_str(&format!("  • {rec}\n"));
            }
        }
        output.push('\n');
        output
    }
}

/// Columns the operator has marked as "not PII"
///
/// Kept apart from [`ClassificationReport`] so the detector signal stays auditable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiOverrides {
    not_pii: BTreeSet<String>,
}

impl PiiOverrides {
    /// Creates an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a column as not PII
    pub fn mark_not_pii(&mut self, column: impl Into<String>) {
        self.not_pii.insert(column.into());
    }

    /// Removes an override, restoring the detector verdict
    pub fn clear(&mut self, column: &str) -> bool {
        self.not_pii.remove(column)
    }

    /// Whether the operator overrode this column
    pub fn is_overridden(&self, column: &str) -> bool {
        self.not_pii.contains(column)
    }

    /// Overridden columns
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.not_pii.iter().map(String::as_str)
    }
}
