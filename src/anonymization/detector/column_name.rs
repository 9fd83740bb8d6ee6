//! Column-name heuristic
//!
//! Column names are split into lower-case tokens on separators and camelCase
//! boundaries (`homePhone`, `home_phone` and `HOME-PHONE` all give
//! `["home", "phone"]`) and matched against a keyword table.

use super::{Candidate, ColumnSample, PiiDetector};
use crate::anonymization::models::{DetectionMethod, PiiType};

const KEYWORD_SCORE: f32 = 0.6;
const HIGH_RISK_SCORE: f32 = 0.8;

/// Checked in order; the first table entry with a hit wins.
const KEYWORDS: &[(PiiType, &[&str])] = &[
    (PiiType::Email, &["email", "mail"]),
    (PiiType::IpAddress, &["ip", "ipaddress", "ipv4", "ipv6"]),
    (PiiType::Ssn, &["ssn", "social", "sin", "nino"]),
    (PiiType::CreditCard, &["card", "creditcard", "cc", "iban"]),
    (PiiType::Phone, &["phone", "telephone", "tel", "mobile", "cell", "fax"]),
    (
        PiiType::Name,
        &["name", "firstname", "lastname", "fullname", "surname", "forename"],
    ),
    (PiiType::PostalCode, &["zip", "zipcode", "postcode", "postal"]),
    (PiiType::Address, &["address", "street", "addr", "city", "county"]),
    (PiiType::Url, &["url", "website", "homepage"]),
    (PiiType::Date, &["dob", "birth", "birthdate", "birthday"]),
    (
        PiiType::Identifier,
        &["passport", "license", "licence", "mrn", "account", "patient"],
    ),
];

/// Tokens that make a `name` column something other than a person's name
const NOT_A_PERSON: &[&str] = &[
    "file", "product", "company", "org", "organisation", "organization", "table", "column",
    "host", "domain", "brand", "user",
];

/// Keywords that mark a column as PII regardless of confidence
pub const DEFAULT_HIGH_RISK_KEYWORDS: &[&str] = &[
    "ssn", "social", "passport", "dob", "birthdate", "mrn", "creditcard", "iban",
];

/// Keyword matcher over column names
pub struct ColumnNameDetector {
    high_risk: Vec<String>,
}

impl ColumnNameDetector {
    /// Detector with the built-in high-risk keyword list
    pub fn new() -> Self {
        Self::with_high_risk_keywords(std::iter::empty::<String>())
    }

    /// Detector with extra high-risk keywords
    pub fn with_high_risk_keywords<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut high_risk: Vec<String> = DEFAULT_HIGH_RISK_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect();
        for keyword in extra {
            let keyword = tokenize(&keyword.into()).concat();
            if !keyword.is_empty() && !high_risk.contains(&keyword) {
                high_risk.push(keyword);
            }
        }
        Self { high_risk }
    }

    /// Whether a name (or any of its tokens) is a high-risk keyword
    pub fn is_high_risk(&self, column: &str) -> bool {
        let tokens = tokenize(column);
        let joined = tokens.concat();
        self.high_risk
            .iter()
            .any(|k| *k == joined || tokens.iter().any(|t| t == k))
    }
}

impl Default for ColumnNameDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PiiDetector for ColumnNameDetector {
    fn name(&self) -> &'static str {
        "column_name"
    }

    fn detect(&self, sample: &ColumnSample<'_>) -> Option<Candidate> {
        let tokens = tokenize(&sample.column.name);
        let joined = tokens.concat();
        let hit = |k: &&str| *k == joined || tokens.iter().any(|t| t == k);

        let pii_type = KEYWORDS.iter().find_map(|(pii_type, keywords)| {
            if !keywords.iter().any(hit) {
                return None;
            }
            if *pii_type == PiiType::Name && tokens.iter().any(|t| NOT_A_PERSON.contains(&t.as_str())) {
                return None;
            }
            Some(*pii_type)
        });
        let high_risk = self.is_high_risk(&sample.column.name);

        match (pii_type, high_risk) {
            (Some(pii_type), high_risk) => {
                let score = if high_risk { HIGH_RISK_SCORE } else { KEYWORD_SCORE };
                let mut candidate = Candidate::new(pii_type, score, DetectionMethod::ColumnName);
                candidate.high_risk = high_risk;
                Some(candidate)
            }
            (None, true) => {
                let mut candidate =
                    Candidate::new(PiiType::Generic, HIGH_RISK_SCORE, DetectionMethod::ColumnName);
                candidate.high_risk = true;
                Some(candidate)
            }
            (None, false) => None,
        }
    }
}

/// Lower-case tokens of a column name
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnType};
    use test_case::test_case;

    fn detect(detector: &ColumnNameDetector, name: &str) -> Option<Candidate> {
        let column = Column::new(name, ColumnType::Text);
        detector.detect(&ColumnSample {
            column: &column,
            values: vec!["x".to_string()],
            rows_sampled: 1,
        })
    }

    #[test_case("homePhone", &["home", "phone"])]
    #[test_case("home_phone", &["home", "phone"])]
    #[test_case("HOME-PHONE", &["home", "phone"])]
    #[test_case("address2", &["address2"])]
    fn test_tokenize(name: &str, expected: &[&str]) {
        assert_eq!(tokenize(name), expected);
    }

    #[test_case("email", PiiType::Email)]
    #[test_case("emailAddress", PiiType::Email)]
    #[test_case("ip_address", PiiType::IpAddress)]
    #[test_case("first_name", PiiType::Name)]
    #[test_case("LastName", PiiType::Name)]
    #[test_case("zip_code", PiiType::PostalCode)]
    #[test_case("street", PiiType::Address)]
    #[test_case("date_of_birth", PiiType::Date)]
    fn test_keyword_types(name: &str, expected: PiiType) {
        let candidate = detect(&ColumnNameDetector::new(), name).unwrap();
        assert_eq!(candidate.pii_type, expected);
    }

    #[test]
    fn test_non_person_names_ignored() {
        let detector = ColumnNameDetector::new();
        assert!(detect(&detector, "file_name").is_none());
        assert!(detect(&detector, "product_name").is_none());
        assert!(detect(&detector, "quantity").is_none());
    }

    #[test]
    fn test_high_risk_keywords() {
        let detector = ColumnNameDetector::with_high_risk_keywords(["Employee_No"]);
        let ssn = detect(&detector, "ssn").unwrap();
        assert!(ssn.high_risk);
        assert_eq!(ssn.score, HIGH_RISK_SCORE);

        let custom = detect(&detector, "employee_no").unwrap();
        assert!(custom.high_risk);
        assert_eq!(custom.pii_type, PiiType::Generic);

        assert!(!detect(&detector, "email").unwrap().high_risk);
    }
}
