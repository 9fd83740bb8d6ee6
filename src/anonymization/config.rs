//! Anonymization configuration
//!
//! [`AnonymizationConfig`] holds the operator's choices for one dataset: the
//! unique-identifier column, the fields to anonymize, a technique and options
//! per field, and whether a lookup file should be produced. It is plain data;
//! [`AnonymizationConfig::validate`] checks it against a dataset and resolves it
//! into a [`ValidatedConfig`] that the preview and commit services execute.
//!
//! [`ConfigBuilder`] supports the incremental editing flow (toggle a field,
//! change its technique, set the identifier) and re-validates after every change.

use crate::anonymization::lookup::is_plain_file_name;
use crate::anonymization::models::{ClassificationReport, PiiType};
use crate::anonymization::technique::{
    Technique, TechniqueCategory, TechniqueId, TechniqueRegistry,
};
use crate::config::loader::substitute_env_vars;
use crate::config::SecretString;
use crate::domain::{Column, ColumnType, ConfigViolation, Dataset, Result, VeilError};
use anyhow::Context;
use regex::Regex;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Technique-specific options for one field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnonymizationOptions {
    /// Key for encryption techniques
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<SecretString>,

    /// Generalization level (1-3), defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generalization_level: Option<u8>,

    /// Regex selecting which interior characters masking replaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_pattern: Option<String>,

    /// PII type used by substitution and redaction; inferred when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute_as: Option<PiiType>,
}

impl AnonymizationOptions {
    /// Effective generalization level
    pub fn level(&self) -> u8 {
        self.generalization_level.unwrap_or(1)
    }

    /// Whether a usable encryption key is present
    pub fn has_encryption_key(&self) -> bool {
        self.encryption_key
            .as_ref()
            .map_or(false, |k| !k.expose_secret().is_blank())
    }
}

/// Technique assignment for one field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTechnique {
    /// Registry key of the technique
    pub technique: String,

    /// Technique options
    #[serde(flatten)]
    pub options: AnonymizationOptions,
}

impl FieldTechnique {
    /// Assignment with default options
    pub fn new(technique: TechniqueId) -> Self {
        Self {
            technique: technique.as_str().to_string(),
            options: AnonymizationOptions::default(),
        }
    }

    /// Replaces the options
    pub fn with_options(mut self, options: AnonymizationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Operator choices for anonymizing one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Column joining rows to lookup records
    #[serde(default)]
    pub unique_identifier: String,

    /// Columns to anonymize
    #[serde(default)]
    pub fields_to_anonymize: BTreeSet<String>,

    /// Technique per column
    #[serde(default)]
    pub technique_per_field: BTreeMap<String, FieldTechnique>,

    /// Emit a lookup table mapping originals to anonymized values
    #[serde(default)]
    pub requires_lookup_file: bool,

    /// File name offered for the lookup table
    #[serde(default = "default_lookup_file_name")]
    pub lookup_file_name: String,
}

fn default_lookup_file_name() -> String {
    "anonymization_lookup.csv".to_string()
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            unique_identifier: String::new(),
            fields_to_anonymize: BTreeSet::new(),
            technique_per_field: BTreeMap::new(),
            requires_lookup_file: false,
            lookup_file_name: default_lookup_file_name(),
        }
    }
}

impl AnonymizationConfig {
    /// Creates a config keyed on a unique identifier column
    pub fn new(unique_identifier: impl Into<String>) -> Self {
        Self {
            unique_identifier: unique_identifier.into(),
            ..Self::default()
        }
    }

    /// Adds a field with a technique and options
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        technique: TechniqueId,
        options: AnonymizationOptions,
    ) -> Self {
        let field = field.into();
        self.fields_to_anonymize.insert(field.clone());
        self.technique_per_field
            .insert(field, FieldTechnique::new(technique).with_options(options));
        self
    }

    /// Requests a lookup table
    pub fn with_lookup_file(mut self, file_name: impl Into<String>) -> Self {
        self.requires_lookup_file = true;
        self.lookup_file_name = file_name.into();
        self
    }

    /// Parses a TOML plan, substituting `${VAR}` placeholders first
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        Ok(toml::from_str(&content)?)
    }

    /// Parses a JSON plan, substituting `${VAR}` placeholders first
    pub fn from_json_str(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads a plan from a `.toml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read anonymization plan: {}", path.display()))?;
        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
        .with_context(|| format!("Failed to parse anonymization plan: {}", path.display()))?;
        Ok(config)
    }

    /// Every problem with this config, in a stable order
    ///
    /// Unknown technique ids surface as [`VeilError::UnknownTechnique`]; every
    /// other rule as [`VeilError::InvalidConfig`].
    pub fn issues(&self, columns: &[Column]) -> Vec<VeilError> {
        let mut issues = Vec::new();
        let has_column = |name: &str| columns.iter().any(|c| c.name == name);

        if self.unique_identifier.trim().is_empty() {
            issues.push(ConfigViolation::MissingUniqueIdentifier.into());
        } else if !has_column(&self.unique_identifier) {
            issues.push(
                ConfigViolation::UnknownUniqueIdentifier(self.unique_identifier.clone()).into(),
            );
        }

        let mut any_reversible = false;
        for field in &self.fields_to_anonymize {
            if !has_column(field) {
                issues.push(ConfigViolation::FieldNotInDataset(field.clone()).into());
                continue;
            }
            let Some(assignment) = self.technique_per_field.get(field) else {
                issues.push(ConfigViolation::MissingTechnique(field.clone()).into());
                continue;
            };
            let technique = match TechniqueRegistry::get(&assignment.technique) {
                Ok(t) => t,
                Err(e) => {
                    issues.push(e);
                    continue;
                }
            };
            any_reversible |= technique.reversible;
            if let Err(violation) = check_options(field, technique, &assignment.options) {
                issues.push(violation.into());
            }
        }

        if self.requires_lookup_file {
            let file_name = self.lookup_file_name.trim();
            if file_name.is_empty() {
                issues.push(ConfigViolation::MissingLookupFileName.into());
            } else if !is_plain_file_name(file_name) {
                issues.push(ConfigViolation::InvalidLookupFileName(file_name.to_string()).into());
            }
            if !any_reversible {
                issues.push(ConfigViolation::LookupWithoutReversibleTechnique.into());
            }
        }

        issues
    }

    /// Validates against a dataset and resolves techniques for execution
    ///
    /// # Errors
    ///
    /// Returns the first problem reported by [`issues`](Self::issues).
    pub fn validate(&self, dataset: &Dataset) -> Result<ValidatedConfig> {
        if let Some(first) = self.issues(dataset.columns()).into_iter().next() {
            return Err(first);
        }

        let mut plan = Vec::with_capacity(self.fields_to_anonymize.len());
        // Column order keeps preview and commit output stable.
        for column in dataset.columns() {
            if !self.fields_to_anonymize.contains(&column.name) {
                continue;
            }
            let Some(assignment) = self.technique_per_field.get(&column.name) else {
                return Err(ConfigViolation::MissingTechnique(column.name.clone()).into());
            };
            let technique = TechniqueRegistry::get(&assignment.technique)?;
            let mask_pattern = match &assignment.options.custom_pattern {
                Some(p) if technique.category == TechniqueCategory::Masking => {
                    Some(Regex::new(p).map_err(|e| ConfigViolation::InvalidMaskPattern {
                        field: column.name.clone(),
                        reason: e.to_string(),
                    })?)
                }
                _ => None,
            };
            plan.push(FieldPlan {
                field: column.name.clone(),
                technique,
                pii_type: assignment
                    .options
                    .substitute_as
                    .unwrap_or_else(|| pii_type_for_column(column.column_type)),
                options: assignment.options.clone(),
                mask_pattern,
            });
        }

        let lookup = self.requires_lookup_file.then(|| LookupRequest {
            file_name: PathBuf::from(self.lookup_file_name.trim()),
        });

        Ok(ValidatedConfig {
            unique_identifier: self.unique_identifier.clone(),
            plan,
            lookup,
        })
    }
}

fn check_options(
    field: &str,
    technique: &Technique,
    options: &AnonymizationOptions,
) -> std::result::Result<(), ConfigViolation> {
    match technique.category {
        TechniqueCategory::Encryption if !options.has_encryption_key() => {
            Err(ConfigViolation::MissingEncryptionKey {
                field: field.to_string(),
                technique: technique.id.to_string(),
            })
        }
        TechniqueCategory::Generalization if !(1..=3).contains(&options.level()) => {
            Err(ConfigViolation::InvalidGeneralizationLevel {
                field: field.to_string(),
                level: options.level(),
            })
        }
        TechniqueCategory::Masking => match &options.custom_pattern {
            Some(p) => Regex::new(p).map(|_| ()).map_err(|e| {
                ConfigViolation::InvalidMaskPattern {
                    field: field.to_string(),
                    reason: e.to_string(),
                }
            }),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

/// PII type implied by a declared column type
pub fn pii_type_for_column(column_type: ColumnType) -> PiiType {
    match column_type {
        ColumnType::Email => PiiType::Email,
        ColumnType::Phone => PiiType::Phone,
        ColumnType::Name => PiiType::Name,
        ColumnType::Address => PiiType::Address,
        ColumnType::Identifier => PiiType::Identifier,
        ColumnType::Date => PiiType::Date,
        ColumnType::Text | ColumnType::Numeric => PiiType::Generic,
    }
}

/// Resolved instructions for one field
#[derive(Debug, Clone)]
pub struct FieldPlan {
    /// Column to anonymize
    pub field: String,
    /// Resolved technique
    pub technique: &'static Technique,
    /// PII type driving substitution and redaction
    pub pii_type: PiiType,
    /// Technique options
    pub options: AnonymizationOptions,
    /// Compiled masking pattern
    pub mask_pattern: Option<Regex>,
}

/// Lookup-table request carried by a validated config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// File name the caller should persist the table under
    pub file_name: PathBuf,
}

/// A config that passed validation against a specific dataset
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Unique identifier column
    pub unique_identifier: String,
    /// Per-field plan, in dataset column order
    pub plan: Vec<FieldPlan>,
    /// Lookup table request, if any
    pub lookup: Option<LookupRequest>,
}

impl ValidatedConfig {
    /// Plan for a field
    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.plan.iter().find(|p| p.field == name)
    }

    /// Whether a column is anonymized
    pub fn is_anonymized(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Incremental editor for an [`AnonymizationConfig`]
///
/// Every mutating call validates the input it is given immediately (unknown
/// columns and technique ids are rejected) and refreshes the list of
/// outstanding issues available through [`issues`](Self::issues).
pub struct ConfigBuilder {
    columns: Vec<Column>,
    classification: Option<ClassificationReport>,
    config: AnonymizationConfig,
}

impl ConfigBuilder {
    /// Starts an empty config for a dataset
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            columns: dataset.columns().to_vec(),
            classification: None,
            config: AnonymizationConfig::default(),
        }
    }

    /// Resumes editing an existing config
    pub fn from_config(dataset: &Dataset, config: AnonymizationConfig) -> Self {
        Self {
            columns: dataset.columns().to_vec(),
            classification: None,
            config,
        }
    }

    /// Uses a classification report to pick default techniques
    pub fn with_classification(mut self, report: ClassificationReport) -> Self {
        self.classification = Some(report);
        self
    }

    fn require_column(&self, name: &str) -> Result<()> {
        if self.columns.iter().any(|c| c.name == name) {
            Ok(())
        } else {
            Err(ConfigViolation::FieldNotInDataset(name.to_string()).into())
        }
    }

    fn revalidate(&self) {
        let issues = self.issues();
        tracing::debug!(
            fields = self.config.fields_to_anonymize.len(),
            outstanding_issues = issues.len(),
            "Anonymization config updated"
        );
    }

    /// Sets the unique identifier column
    pub fn set_unique_identifier(&mut self, column: &str) -> Result<()> {
        if !self.columns.iter().any(|c| c.name == column) {
            return Err(ConfigViolation::UnknownUniqueIdentifier(column.to_string()).into());
        }
        self.config.unique_identifier = column.to_string();
        self.revalidate();
        Ok(())
    }

    /// Adds or removes a field, returning whether it is now selected
    ///
    /// A newly selected field without a technique gets the one suggested for
    /// its classified PII type, or masking when there is no classification.
    pub fn toggle_field(&mut self, column: &str) -> Result<bool> {
        self.require_column(column)?;

        let selected = if self.config.fields_to_anonymize.remove(column) {
            false
        } else {
            self.config.fields_to_anonymize.insert(column.to_string());
            if !self.config.technique_per_field.contains_key(column) {
                let mut assignment = FieldTechnique::new(TechniqueId::Mask);
                if let Some(c) = self.classification.as_ref().and_then(|r| r.get(column)) {
                    if c.is_pii {
                        assignment = FieldTechnique::new(c.pii_type.suggested_technique());
                        assignment.options.substitute_as = Some(c.pii_type);
                    }
                }
                self.config
                    .technique_per_field
                    .insert(column.to_string(), assignment);
            }
            true
        };

        self.revalidate();
        Ok(selected)
    }

    /// Assigns a technique to a field, keeping its current options
    pub fn set_technique(&mut self, column: &str, technique: &str) -> Result<()> {
        self.require_column(column)?;
        let technique = TechniqueRegistry::get(technique)?;
        self.config
            .technique_per_field
            .entry(column.to_string())
            .and_modify(|a| a.technique = technique.id.as_str().to_string())
            .or_insert_with(|| FieldTechnique::new(technique.id));
        self.revalidate();
        Ok(())
    }

    /// Replaces a field's options
    pub fn set_options(&mut self, column: &str, options: AnonymizationOptions) -> Result<()> {
        self.require_column(column)?;
        let Some(assignment) = self.config.technique_per_field.get_mut(column) else {
            return Err(ConfigViolation::MissingTechnique(column.to_string()).into());
        };
        assignment.options = options;
        self.revalidate();
        Ok(())
    }

    /// Turns the lookup file on or off
    pub fn set_lookup_file(&mut self, enabled: bool, file_name: Option<&str>) {
        self.config.requires_lookup_file = enabled;
        if let Some(name) = file_name {
            self.config.lookup_file_name = name.to_string();
        }
        self.revalidate();
    }

    /// Outstanding problems with the current config
    pub fn issues(&self) -> Vec<VeilError> {
        self.config.issues(&self.columns)
    }

    /// Current config
    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }

    /// Finishes editing
    pub fn build(self) -> AnonymizationConfig {
        self.config
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path must be set when audit logging is enabled".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Column::new("id", ColumnType::Identifier),
                Column::new("email", ColumnType::Email),
                Column::new("age", ColumnType::Numeric),
            ],
            vec![json!({"id": 1, "email": "a@example.com", "age": 27})
                .as_object()
                .cloned()
                .unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_config_resolves_plan() {
        let config = AnonymizationConfig::new("id")
            .with_field("age", TechniqueId::Generalize, AnonymizationOptions::default())
            .with_field("email", TechniqueId::Hash, AnonymizationOptions::default());

        let validated = config.validate(&dataset()).unwrap();
        let fields: Vec<_> = validated.plan.iter().map(|p| p.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "age"]);
        assert_eq!(validated.field("email").unwrap().pii_type, PiiType::Email);
        assert!(validated.lookup.is_none());
    }

    #[test]
    fn test_missing_unique_identifier() {
        let config = AnonymizationConfig::default().with_field(
            "email",
            TechniqueId::Hash,
            AnonymizationOptions::default(),
        );
        let err = config.validate(&dataset()).unwrap_err();
        assert!(matches!(
            err,
            VeilError::InvalidConfig(ConfigViolation::MissingUniqueIdentifier)
        ));
    }

    #[test]
    fn test_unknown_columns() {
        let config = AnonymizationConfig::new("uuid");
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::UnknownUniqueIdentifier(_))
        ));

        let config = AnonymizationConfig::new("id").with_field(
            "phone",
            TechniqueId::Mask,
            AnonymizationOptions::default(),
        );
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::FieldNotInDataset(ref f)) if f == "phone"
        ));
    }

    #[test]
    fn test_field_without_technique() {
        let mut config = AnonymizationConfig::new("id");
        config.fields_to_anonymize.insert("email".to_string());
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::MissingTechnique(_))
        ));
    }

    #[test]
    fn test_unknown_technique_id() {
        let mut config = AnonymizationConfig::new("id");
        config.fields_to_anonymize.insert("email".to_string());
        config.technique_per_field.insert(
            "email".to_string(),
            FieldTechnique {
                technique: "scramble".to_string(),
                options: AnonymizationOptions::default(),
            },
        );
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::UnknownTechnique(_)
        ));
    }

    #[test]
    fn test_encryption_requires_key() {
        let config = AnonymizationConfig::new("id").with_field(
            "email",
            TechniqueId::Encrypt,
            AnonymizationOptions {
                encryption_key: Some(secret_string("  ".to_string())),
                ..Default::default()
            },
        );
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::MissingEncryptionKey { .. })
        ));
    }

    #[test]
    fn test_generalization_level_range() {
        let config = AnonymizationConfig::new("id").with_field(
            "age",
            TechniqueId::Generalize,
            AnonymizationOptions {
                generalization_level: Some(4),
                ..Default::default()
            },
        );
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::InvalidGeneralizationLevel { level: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_mask_pattern() {
        let config = AnonymizationConfig::new("id").with_field(
            "email",
            TechniqueId::Mask,
            AnonymizationOptions {
                custom_pattern: Some("[a-".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::InvalidMaskPattern { .. })
        ));
    }

    #[test]
    fn test_lookup_requires_reversible_technique() {
        let config = AnonymizationConfig::new("id")
            .with_field("email", TechniqueId::Hash, AnonymizationOptions::default())
            .with_lookup_file("lookup.csv");
        assert!(matches!(
            config.validate(&dataset()).unwrap_err(),
            VeilError::InvalidConfig(ConfigViolation::LookupWithoutReversibleTechnique)
        ));

        let config = AnonymizationConfig::new("id")
            .with_field("email", TechniqueId::Substitute, AnonymizationOptions::default())
            .with_lookup_file("lookup.csv");
        let validated = config.validate(&dataset()).unwrap();
        assert_eq!(
            validated.lookup.unwrap().file_name,
            PathBuf::from("lookup.csv")
        );
    }

    #[test]
    fn test_issues_lists_every_problem() {
        let mut config = AnonymizationConfig::default()
            .with_field("phone", TechniqueId::Mask, AnonymizationOptions::default())
            .with_lookup_file("");
        config.fields_to_anonymize.insert("email".to_string());
        let issues = config.issues(dataset().columns());
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn test_lookup_file_name_must_be_plain() {
        for name in ["../lookup.csv", "/tmp/lookup.csv", "out/lookup.csv"] {
            let config = AnonymizationConfig::new("id")
                .with_field("email", TechniqueId::Tokenize, AnonymizationOptions::default())
                .with_lookup_file(name);
            assert!(
                matches!(
                    config.validate(&dataset()),
                    Err(VeilError::InvalidConfig(ConfigViolation::InvalidLookupFileName(_)))
                ),
                "accepted {name}"
            );
        }

        let config = AnonymizationConfig::new("id")
            .with_field("email", TechniqueId::Tokenize, AnonymizationOptions::default())
            .with_lookup_file("lookup.csv");
        assert!(config.validate(&dataset()).is_ok());
    }

    #[test]
    fn test_builder_flow() {
        let dataset = dataset();
        let mut builder = ConfigBuilder::new(&dataset);

        assert!(builder.toggle_field("email").unwrap());
        assert_eq!(builder.config().technique_per_field["email"].technique, "mask");
        assert_eq!(builder.issues().len(), 1);

        builder.set_unique_identifier("id").unwrap();
        assert!(builder.issues().is_empty());

        builder.set_technique("email", "encrypt").unwrap();
        assert_eq!(builder.issues().len(), 1);
        builder
            .set_options(
                "email",
                AnonymizationOptions {
                    encryption_key: Some(secret_string("k3y".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(builder.issues().is_empty());

        assert!(builder.set_technique("email", "scramble").is_err());
        assert!(builder.toggle_field("missing").is_err());
        assert!(builder.set_unique_identifier("missing").is_err());

        // Toggling out keeps the technique choice for later.
        assert!(!builder.toggle_field("email").unwrap());
        let config = builder.build();
        assert!(config.fields_to_anonymize.is_empty());
        assert!(config.technique_per_field.contains_key("email"));
    }

    #[test]
    fn test_plan_from_toml() {
        std::env::set_var("VEIL_TEST_PLAN_KEY", "from-env");
        let config = AnonymizationConfig::from_toml_str(
            r#"
unique_identifier = "id"
fields_to_anonymize = ["email", "age"]
requires_lookup_file = true

[technique_per_field.email]
technique = "encrypt"
encryption_key = "${VEIL_TEST_PLAN_KEY}"

[technique_per_field.age]
technique = "generalize"
generalization_level = 2
"#,
        )
        .unwrap();
        std::env::remove_var("VEIL_TEST_PLAN_KEY");

        let email = &config.technique_per_field["email"];
        assert_eq!(
            email.options.encryption_key.as_ref().unwrap().expose_secret().as_str(),
            "from-env"
        );
        assert_eq!(config.technique_per_field["age"].options.level(), 2);
        assert_eq!(config.lookup_file_name, "anonymization_lookup.csv");
        assert!(config.validate(&dataset()).is_ok());
    }
}
