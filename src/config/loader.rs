//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VeilConfig;
use crate::domain::errors::VeilError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VeilConfig
/// 4. Applies environment variable overrides (VEIL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`VeilError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use veil::config::loader::load_config;
///
/// let config = load_config("veil.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VeilConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VeilError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VeilError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: VeilConfig = toml::from_str(&contents)
        .map_err(|e| VeilError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        VeilError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. All unset variables are reported
/// together.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
pub(crate) fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| VeilError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        result.push_str(&processed);
    }

    if !missing_vars.is_empty() {
        return Err(VeilError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using VEIL_* prefix
///
/// Environment variables follow the pattern: VEIL_<SECTION>_<KEY>,
/// for example VEIL_CLASSIFIER_SAMPLE_ROWS or VEIL_COMMIT_PARALLEL.
/// Values that fail to parse are ignored.
fn apply_env_overrides(config: &mut VeilConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("VEIL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Classifier overrides
    if let Some(rows) = parsed_var("VEIL_CLASSIFIER_SAMPLE_ROWS") {
        config.classifier.sample_rows = rows;
    }
    if let Some(threshold) = parsed_var("VEIL_CLASSIFIER_CONFIDENCE_THRESHOLD") {
        config.classifier.confidence_threshold = threshold;
    }
    if let Ok(val) = std::env::var("VEIL_CLASSIFIER_PATTERN_LIBRARY") {
        config.classifier.pattern_library = Some(val.into());
    }

    // Preview overrides
    if let Some(size) = parsed_var("VEIL_PREVIEW_SAMPLE_SIZE") {
        config.preview.sample_size = size;
    }
    if let Some(size) = parsed_var("VEIL_PREVIEW_MAX_SAMPLE_SIZE") {
        config.preview.max_sample_size = size;
    }

    // Commit overrides
    if let Some(size) = parsed_var("VEIL_COMMIT_BATCH_SIZE") {
        config.commit.batch_size = size;
    }
    if let Some(parallel) = parsed_var("VEIL_COMMIT_PARALLEL") {
        config.commit.parallel = parallel;
    }

    // Audit overrides
    if let Some(enabled) = parsed_var("VEIL_AUDIT_ENABLED") {
        config.audit.enabled = enabled;
    }
    if let Ok(val) = std::env::var("VEIL_AUDIT_LOG_PATH") {
        config.audit.log_path = val.into();
    }

    // Logging overrides
    if let Some(enabled) = parsed_var("VEIL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("VEIL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("VEIL_TEST_SUBST_KEY", "test_value");
        let input = "encryption_key = \"${VEIL_TEST_SUBST_KEY}\"\n";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "encryption_key = \"test_value\"\n");
        std::env::remove_var("VEIL_TEST_SUBST_KEY");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("VEIL_TEST_MISSING_A");
        std::env::remove_var("VEIL_TEST_MISSING_B");
        let input = "a = \"${VEIL_TEST_MISSING_A}\"\nb = \"${VEIL_TEST_MISSING_B}${VEIL_TEST_MISSING_A}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("VEIL_TEST_MISSING_A, VEIL_TEST_MISSING_B"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("VEIL_TEST_COMMENTED");
        let input = "# key = \"${VEIL_TEST_COMMENTED}\"\nsample_rows = 10";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(VeilError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[classifier]
sample_rows = 50
confidence_threshold = 0.7
high_risk_keywords = ["patient_id"]

[commit]
batch_size = 250
parallel = false

[audit]
enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.classifier.sample_rows, 50);
        assert_eq!(config.classifier.high_risk_keywords, vec!["patient_id"]);
        assert_eq!(config.commit.batch_size, 250);
        assert!(!config.commit.parallel);
        assert!(!config.audit.enabled);
        assert_eq!(config.preview.sample_size, 5);
    }

    #[test]
    fn test_load_config_invalid_section() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[classifier]\nconfidence_threshold = 2.0\n")
            .unwrap();

        let err = load_config(temp_file.path()).unwrap_err().to_string();
        assert!(err.contains("confidence_threshold"));
    }
}
