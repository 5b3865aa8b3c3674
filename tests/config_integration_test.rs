//! Integration tests for configuration loading and validation
//!
//! Tests touching `BIOBANK_*` variables hold `ENV_MUTEX` so they cannot
//! observe each other's environment.

use biobank::config::{load_config, Environment};
use biobank::domain::BiobankError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "BIOBANK_APPLICATION_LOG_LEVEL",
        "BIOBANK_API_BASE_URL",
        "BIOBANK_API_TIMEOUT_SECONDS",
        "BIOBANK_API_AUTH_TOKEN",
        "BIOBANK_API_TLS_VERIFY",
        "BIOBANK_LOGGING_LOCAL_ROTATION",
        "TEST_BIOBANK_TOKEN",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
environment = "staging"

[application]
log_level = "debug"

[api]
base_url = "https://biobank.example.org/api"
timeout_seconds = 45
connect_timeout_seconds = 5
auth_token = "abc123"
tls_verify = true

[logging]
local_enabled = true
local_path = "/tmp/biobank"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.api.base_url, "https://biobank.example.org/api");
    assert_eq!(config.api.timeout_seconds, 45);
    assert_eq!(config.api.connect_timeout_seconds, 5);
    assert_eq!(
        config.api.auth_token.as_ref().unwrap().expose_secret().to_string(),
        "abc123"
    );
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/tmp/biobank");
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
[api]
base_url = "http://localhost:9000/api"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.api.timeout_seconds, 30);
    assert_eq!(config.api.connect_timeout_seconds, 10);
    assert!(config.api.auth_token.is_none());
    assert!(config.api.tls_verify);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "daily");
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_BIOBANK_TOKEN", "from-env");
    let file = write_config(
        r#"
[api]
base_url = "https://biobank.example.org/api"
auth_token = "${TEST_BIOBANK_TOKEN}"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(
        config.api.auth_token.as_ref().unwrap().expose_secret().to_string(),
        "from-env"
    );
    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
[api]
base_url = "https://biobank.example.org/api"
auth_token = "${TEST_BIOBANK_TOKEN}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();

    assert!(matches!(err, BiobankError::Configuration(_)));
    assert!(err.to_string().contains("TEST_BIOBANK_TOKEN"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("BIOBANK_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("BIOBANK_API_BASE_URL", "https://other.example.org/api");
    std::env::set_var("BIOBANK_API_TIMEOUT_SECONDS", "90");
    std::env::set_var("BIOBANK_LOGGING_LOCAL_ROTATION", "never");
    let file = write_config(
        r#"
[application]
log_level = "info"

[api]
base_url = "https://biobank.example.org/api"
timeout_seconds = 30
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.api.base_url, "https://other.example.org/api");
    assert_eq!(config.api.timeout_seconds, 90);
    assert_eq!(config.logging.local_rotation, "never");
    cleanup_env_vars();
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
[application]
log_level = "loud"

[api]
base_url = "https://biobank.example.org/api"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("log_level"));
}

#[test]
fn test_production_refuses_disabled_tls_verification() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
environment = "production"

[api]
base_url = "https://biobank.example.org/api"
tls_verify = false
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TLS certificate verification"));
}

#[test]
fn test_non_http_base_url_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
[api]
base_url = "ftp://biobank.example.org/api"
"#,
    );

    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_missing_api_section_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
[application]
log_level = "info"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
