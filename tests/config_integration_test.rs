//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use veil::anonymization::{AnonymizationConfig, TechniqueId, VeilEngine};
use veil::config::load_config;
use veil::domain::Dataset;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("VEIL_APPLICATION_LOG_LEVEL");
    std::env::remove_var("VEIL_CLASSIFIER_SAMPLE_ROWS");
    std::env::remove_var("VEIL_COMMIT_BATCH_SIZE");
    std::env::remove_var("VEIL_COMMIT_PARALLEL");
    std::env::remove_var("VEIL_AUDIT_ENABLED");
    std::env::remove_var("TEST_VEIL_AUDIT_DIR");
    std::env::remove_var("TEST_VEIL_SSN_KEY");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let file = write_config(
        r#"
[application]
log_level = "debug"

[classifier]
sample_rows = 250
confidence_threshold = 0.7
high_risk_keywords = ["member_no"]

[preview]
sample_size = 10
max_sample_size = 50

[commit]
batch_size = 500
parallel = false

[audit]
enabled = true
log_path = "/var/log/veil/audit.log"
json_format = false

[logging]
local_enabled = true
local_path = "/var/log/veil"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.classifier.sample_rows, 250);
    assert_eq!(config.classifier.confidence_threshold, 0.7);
    assert_eq!(config.classifier.high_risk_keywords, vec!["member_no"]);
    assert_eq!(config.preview.sample_size, 10);
    assert_eq!(config.preview.max_sample_size, 50);
    assert_eq!(config.commit.batch_size, 500);
    assert!(!config.commit.parallel);
    assert!(!config.audit.json_format);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_config_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let file = write_config("");

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.classifier.sample_rows, 100);
    assert_eq!(config.classifier.confidence_threshold, 0.5);
    assert_eq!(config.preview.sample_size, 5);
    assert_eq!(config.commit.batch_size, 1000);
    assert!(config.commit.parallel);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_VEIL_AUDIT_DIR", "/srv/audit");
    let file = write_config(
        r#"
[audit]
log_path = "${TEST_VEIL_AUDIT_DIR}/veil.log"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.audit.log_path,
        std::path::PathBuf::from("/srv/audit/veil.log")
    );
    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let file = write_config(
        r#"
[audit]
log_path = "${TEST_VEIL_AUDIT_DIR}/veil.log"
"#,
    );

    let err = load_config(file.path()).unwrap_err().to_string();
    assert!(err.contains("TEST_VEIL_AUDIT_DIR"));
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("VEIL_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("VEIL_CLASSIFIER_SAMPLE_ROWS", "40");
    std::env::set_var("VEIL_COMMIT_BATCH_SIZE", "64");
    std::env::set_var("VEIL_COMMIT_PARALLEL", "false");
    std::env::set_var("VEIL_AUDIT_ENABLED", "not-a-bool");
    let file = write_config(
        r#"
[commit]
batch_size = 500
parallel = true

[audit]
enabled = true
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.classifier.sample_rows, 40);
    assert_eq!(config.commit.batch_size, 64);
    assert!(!config.commit.parallel);
    // Unparseable overrides are ignored
    assert!(config.audit.enabled);
    cleanup_env_vars();
}

#[test]
fn test_override_is_validated() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("VEIL_COMMIT_BATCH_SIZE", "0");
    let file = write_config("");

    let err = load_config(file.path()).unwrap_err().to_string();
    assert!(err.contains("commit.batch_size"));
    cleanup_env_vars();
}

#[test]
fn test_invalid_values_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    for content in [
        "[application]\nlog_level = \"loud\"",
        "[classifier]\nconfidence_threshold = 1.5",
        "[classifier]\nsample_rows = 0",
        "[preview]\nsample_size = 20\nmax_sample_size = 10",
        "[logging]\nlocal_rotation = \"weekly\"",
        "[classifier]\npattern_library = \"/nonexistent/patterns.toml\"",
    ] {
        let file = write_config(content);
        assert!(load_config(file.path()).is_err(), "accepted: {content}");
    }
}

#[test]
fn test_plan_reads_key_from_environment() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_VEIL_SSN_KEY", "from-the-environment");

    let mut plan_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    plan_file
        .write_all(
            br#"
unique_identifier = "id"
fields_to_anonymize = ["ssn"]

[technique_per_field.ssn]
technique = "encrypt"
encryption_key = "${TEST_VEIL_SSN_KEY}"
"#,
        )
        .unwrap();

    let plan = AnonymizationConfig::from_path(plan_file.path()).unwrap();
    let assignment = &plan.technique_per_field["ssn"];
    assert_eq!(assignment.technique, TechniqueId::Encrypt.as_str());
    let key = assignment.options.encryption_key.as_ref().unwrap();
    assert_eq!(key.expose_secret().as_str(), "from-the-environment");
    assert!(!format!("{plan:?}").contains("from-the-environment"));
    cleanup_env_vars();

    let dataset = Dataset::from_json_str(
        r#"{"columns": [{"name": "id"}, {"name": "ssn"}], "rows": [{"id": 1, "ssn": "123-45-6789"}]}"#,
    )
    .unwrap();
    let mut config = veil::config::VeilConfig::default();
    config.audit.enabled = false;
    let outcome = VeilEngine::new(&config).unwrap().commit(&dataset, &plan).unwrap();
    let sealed = outcome.dataset.dataset().rows()[0]["ssn"].as_str().unwrap().to_string();
    assert_eq!(
        veil::anonymization::transform::encryption::decrypt(&sealed, "from-the-environment")
            .unwrap(),
        "123-45-6789"
    );
}
