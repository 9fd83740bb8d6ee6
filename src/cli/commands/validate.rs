//! Validate config command implementation
//!
//! Checks the Veil configuration file. Given `--plan` and `--dataset`, it
//! also lists every problem with the anonymization plan for that dataset.

use crate::anonymization::AnonymizationConfig;
use crate::config::load_config;
use crate::domain::Dataset;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Anonymization plan to check
    #[arg(short, long, requires = "dataset")]
    pub plan: Option<PathBuf>,

    /// Dataset the plan is checked against
    #[arg(short, long, requires = "plan")]
    pub dataset: Option<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates every section
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Sample Rows: {}", config.classifier.sample_rows);
        println!(
            "  Confidence Threshold: {}",
            config.classifier.confidence_threshold
        );
        println!(
            "  Pattern Library: {}",
            config
                .classifier
                .pattern_library
                .as_ref()
                .map_or("built-in".to_string(), |p| p.display().to_string())
        );
        println!("  Preview Rows: {}", config.preview.sample_size);
        println!("  Commit Batch Size: {}", config.commit.batch_size);
        println!("  Parallel Commit: {}", config.commit.parallel);
        println!(
            "  Audit Log: {}",
            if config.audit.enabled {
                config.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!();

        match (&self.plan, &self.dataset) {
            (Some(plan), Some(dataset)) => self.validate_plan(plan, dataset),
            _ => Ok(0),
        }
    }

    fn validate_plan(&self, plan_path: &PathBuf, dataset_path: &PathBuf) -> anyhow::Result<i32> {
        println!("🔍 Validating plan {} against {}", plan_path.display(), dataset_path.display());

        let plan = match AnonymizationConfig::from_path(plan_path) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Failed to load plan");
                println!("   Error: {e:#}");
                return Ok(2);
            }
        };
        let dataset = match Dataset::from_path(dataset_path) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Failed to load dataset");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let issues = plan.issues(dataset.columns());
        if issues.is_empty() {
            println!("✅ Plan is valid ({} fields)", plan.fields_to_anonymize.len());
            return Ok(0);
        }

        println!("❌ Plan has {} problem(s):", issues.len());
        for issue in &issues {
            println!("   - {issue}");
        }
        Ok(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let args = ValidateArgs {
            plan: None,
            dataset: None,
        };
        assert_eq!(args.execute("/nonexistent/veil.toml").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_validate_plan_with_issues() {
        let mut config = NamedTempFile::new().unwrap();
        config.write_all(b"[audit]\nenabled = false\n").unwrap();

        let mut dataset = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        dataset
            .write_all(br#"{"columns": [{"name": "id"}, {"name": "email"}], "rows": []}"#)
            .unwrap();

        let mut plan = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        plan.write_all(
            br#"
unique_identifier = "id"
fields_to_anonymize = ["email", "phone"]

[technique_per_field.email]
technique = "scramble"
"#,
        )
        .unwrap();

        let args = ValidateArgs {
            plan: Some(plan.path().to_path_buf()),
            dataset: Some(dataset.path().to_path_buf()),
        };
        let code = args
            .execute(config.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
