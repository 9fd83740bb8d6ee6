//! Value pattern library
//!
//! The library is a TOML table of named entries. Each entry lists one or more
//! anchored regexes, the PII type they indicate and the confidence a column
//! earns when every sampled value matches:
//!
//! ```toml
//! [patterns.email]
//! category = "EMAIL"
//! confidence = 0.95
//! patterns = ['^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$']
//! ```
//!
//! A built-in library is embedded at compile time; `classifier.pattern_library`
//! replaces it with a file.

use crate::anonymization::models::PiiType;
use anyhow::{Context, Result};
use regex::RegexSet;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const BUILT_IN_LIBRARY: &str = include_str!("../../../../patterns/pii_patterns.toml");

#[derive(Debug, Deserialize)]
struct RawEntry {
    category: String,
    confidence: f32,
    patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLibrary {
    // BTreeMap keeps entry order independent of hash seeds.
    patterns: BTreeMap<String, RawEntry>,
}

/// One compiled library entry
#[derive(Debug, Clone)]
pub struct PatternEntry {
    /// Entry name from the library table
    pub name: String,
    /// PII type the entry indicates
    pub pii_type: PiiType,
    /// Score when every sampled value matches
    pub confidence: f32,
    regexes: RegexSet,
}

impl PatternEntry {
    /// Whether any of the entry's regexes matches the trimmed value
    pub fn matches(&self, value: &str) -> bool {
        self.regexes.is_match(value.trim())
    }

    /// Number of regexes in the entry
    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    /// Whether the entry has no regexes
    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }
}

/// Compiled pattern library
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    entries: Vec<PatternEntry>,
}

impl PatternRegistry {
    /// Loads a library file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern library: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid pattern library: {}", path.display()))
    }

    /// Compiles a library from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let entries = raw
            .patterns
            .into_iter()
            .map(|(name, entry)| compile_entry(name, entry))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(entries = entries.len(), "Pattern library compiled");
        Ok(Self { entries })
    }

    /// The embedded library
    pub fn default_patterns() -> Result<Self> {
        Self::from_toml(BUILT_IN_LIBRARY)
    }

    /// Entries in name order
    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    /// Entry by name
    pub fn entry(&self, name: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Distinct PII types covered by the library
    pub fn types(&self) -> Vec<PiiType> {
        let mut types: Vec<PiiType> = self.entries.iter().map(|e| e.pii_type).collect();
        types.sort();
        types.dedup();
        types
    }
}

fn compile_entry(name: String, entry: RawEntry) -> Result<PatternEntry> {
    let pii_type = PiiType::parse_label(&entry.category)
        .with_context(|| format!("Unknown category '{}' in pattern '{name}'", entry.category))?;
    if !(0.0..=1.0).contains(&entry.confidence) {
        anyhow::bail!(
            "Confidence for pattern '{name}' must be between 0.0 and 1.0, got {}",
            entry.confidence
        );
    }
    if entry.patterns.is_empty() {
        anyhow::bail!("Pattern '{name}' lists no regexes");
    }
    let regexes = RegexSet::new(&entry.patterns)
        .with_context(|| format!("Invalid regex in pattern '{name}'"))?;

    Ok(PatternEntry {
        name,
        pii_type,
        confidence: entry.confidence,
        regexes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_built_in_library_loads() {
        let registry = PatternRegistry::default_patterns().unwrap();
        assert!(!registry.entries().is_empty());
        assert!(registry.types().contains(&PiiType::Ssn));
        assert!(registry.types().contains(&PiiType::Email));
    }

    #[test_case("email", "test@example.com", true ; "email")]
    #[test_case("email", "not-an-email", false ; "not an email")]
    #[test_case("email", "contact test@example.com today", false ; "embedded email")]
    #[test_case("phone", "(555) 123-4567", true ; "us phone with parens")]
    #[test_case("phone", "555-123-4567", true ; "us phone")]
    #[test_case("phone", "+1 555 123 4567", true ; "international phone")]
    #[test_case("ssn", " 123-45-6789 ", true ; "padded ssn")]
    fn test_entry_matching(entry: &str, value: &str, expected: bool) {
        let registry = PatternRegistry::default_patterns().unwrap();
        assert_eq!(registry.entry(entry).unwrap().matches(value), expected);
    }

    #[test]
    fn test_invalid_library() {
        let bad_category = r#"
[patterns.x]
category = "SHOE_SIZE"
confidence = 0.5
patterns = ['^\d+$']
"#;
        assert!(PatternRegistry::from_toml(bad_category).is_err());

        let bad_regex = r#"
[patterns.x]
category = "EMAIL"
confidence = 0.5
patterns = ['([a-z']
"#;
        assert!(PatternRegistry::from_toml(bad_regex).is_err());

        let no_regexes = r#"
[patterns.x]
category = "EMAIL"
confidence = 0.5
patterns = []
"#;
        assert!(PatternRegistry::from_toml(no_regexes).is_err());
    }

    #[test]
    fn test_library_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.toml");
        std::fs::write(
            &path,
            "[patterns.member]\ncategory = \"IDENTIFIER\"\nconfidence = 0.8\npatterns = ['^M\\d{6}$']\n",
        )
        .unwrap();

        let registry = PatternRegistry::from_file(&path).unwrap();
        assert_eq!(registry.types(), vec![PiiType::Identifier]);
        assert!(registry.entry("member").unwrap().matches("M123456"));
        assert!(PatternRegistry::from_file(dir.path().join("missing.toml")).is_err());
    }
}
