//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file, and optionally a sample anonymization plan.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veil.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Also write a sample anonymization plan to this path
    #[arg(long)]
    pub plan: Option<String>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Veil configuration");
        println!();

        let mut targets = vec![(self.output.as_str(), self.config_content())];
        if let Some(plan) = &self.plan {
            targets.push((plan.as_str(), Self::generate_sample_plan()));
        }

        for (path, _) in &targets {
            if Path::new(path).exists() && !self.force {
                println!("❌ File already exists: {path}");
                println!("   Use --force to overwrite");
                return Ok(2);
            }
        }

        for (path, content) in &targets {
            if let Err(e) = fs::write(path, content) {
                println!("❌ Failed to write {path}");
                println!("   Error: {e}");
                return Ok(5);
            }
            println!("✅ Created: {path}");
        }

        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your settings", self.output);
        println!("  2. Validate configuration: veil validate-config");
        println!("  3. Find PII columns: veil classify --dataset data.json --plan-out plan.toml");
        println!("  4. Review the plan, then preview it: veil preview --dataset data.json --plan plan.toml");
        println!("  5. Anonymize: veil commit --dataset data.json --plan plan.toml --output anonymized.json");
        println!();
        Ok(0)
    }

    fn config_content(&self) -> String {
        if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Veil Configuration File
# PII classification and dataset anonymization

[application]
log_level = "info"

[classifier]
sample_rows = 100
confidence_threshold = 0.5

[preview]
sample_size = 5
max_sample_size = 100

[commit]
batch_size = 1000
parallel = true

[audit]
enabled = true
log_path = "./audit/anonymization.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Veil Configuration File
# PII classification and dataset anonymization
#
# Every setting has a default; remove what you do not need to change.
# Values of the form ${VAR_NAME} are read from the environment, and
# VEIL_<SECTION>_<KEY> variables override any setting after parsing.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "info"

# ============================================================================
# PII Classification
# ============================================================================
[classifier]
# Rows inspected per classification (from the top of the dataset)
sample_rows = 100

# Columns scoring at or above this confidence are flagged as PII (0.0-1.0)
confidence_threshold = 0.5

# Optional: replace the built-in value pattern library
# pattern_library = "patterns/pii_patterns.toml"

# Extra column-name keywords that always flag a column as PII
# high_risk_keywords = ["patient_id", "member_no"]

# ============================================================================
# Preview
# ============================================================================
[preview]
# Rows shown when --rows is not given
sample_size = 5

# Upper bound for --rows
max_sample_size = 100

# ============================================================================
# Commit
# ============================================================================
[commit]
# Rows per batch; cancellation (Ctrl+C) is checked between batches
batch_size = 1000

# Spread each batch across all CPU cores
parallel = true

# ============================================================================
# Audit Log
# ============================================================================
[audit]
# Record every commit (ids, counts, techniques; never cell values)
enabled = true
log_path = "./audit/anonymization.log"

# JSON lines (true) or plain text (false)
json_format = true

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Write JSON logs to files in addition to the console
local_enabled = false
local_path = "./logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate a sample anonymization plan
    fn generate_sample_plan() -> String {
        r#"# Veil Anonymization Plan
#
# Techniques: mask, hash, substitute, tokenize, encrypt, generalize, remove, redact
# Run `veil techniques` for details.

# Column that identifies a row; joins the lookup file to the output
unique_identifier = "customer_id"

fields_to_anonymize = ["email", "full_name", "birth_date", "card_number"]

# Write a lookup file mapping original to anonymized values.
# Requires at least one reversible technique (substitute, tokenize, encrypt).
requires_lookup_file = true
lookup_file_name = "customers_lookup.csv"

[technique_per_field.email]
technique = "tokenize"

[technique_per_field.full_name]
technique = "substitute"
substitute_as = "name"

[technique_per_field.birth_date]
technique = "generalize"
# 1 = quarter, 2 = year, 3 = decade
generalization_level = 2

[technique_per_field.card_number]
technique = "mask"
# Only digits are masked; separators stay in place
custom_pattern = "[0-9]"

# Encryption keys belong in the environment, never in this file:
# [technique_per_field.ssn]
# technique = "encrypt"
# encryption_key = "${VEIL_SSN_KEY}"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::{AnonymizationConfig, TechniqueId};
    use crate::config::VeilConfig;

    #[test]
    fn test_generated_configs_are_valid() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: VeilConfig = toml::from_str(&content).unwrap();
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_sample_plan_parses() {
        let plan = AnonymizationConfig::from_toml_str(&InitArgs::generate_sample_plan()).unwrap();
        assert_eq!(plan.unique_identifier, "customer_id");
        assert_eq!(plan.fields_to_anonymize.len(), 4);
        assert_eq!(
            plan.technique_per_field["email"].technique,
            TechniqueId::Tokenize.as_str()
        );
        assert_eq!(
            plan.technique_per_field["birth_date"].options.generalization_level,
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("veil.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            plan: None,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }
}
