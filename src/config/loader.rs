//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BiobankConfig;
use super::secret::secret_string;
use crate::domain::errors::BiobankError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`BiobankConfig`]
/// 4. Applies environment variable overrides (`BIOBANK_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`BiobankError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use biobank::config::loader::load_config;
///
/// let config = load_config("biobank.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BiobankConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BiobankError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BiobankError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BiobankConfig = toml::from_str(&contents)
        .map_err(|e| BiobankError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        BiobankError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched. Every missing variable is reported
/// in a single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BiobankError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BiobankError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `BIOBANK_` prefix
///
/// Variables follow the pattern `BIOBANK_<SECTION>_<KEY>`, for example
/// `BIOBANK_API_BASE_URL`. Unparsable numeric or boolean values are ignored.
fn apply_env_overrides(config: &mut BiobankConfig) {
    if let Ok(val) = std::env::var("BIOBANK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("BIOBANK_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("BIOBANK_API_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.api.timeout_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("BIOBANK_API_CONNECT_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.api.connect_timeout_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("BIOBANK_API_AUTH_TOKEN") {
        config.api.auth_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("BIOBANK_API_TLS_VERIFY") {
        if let Ok(verify) = val.parse() {
            config.api.tls_verify = verify;
        }
    }

    if let Ok(val) = std::env::var("BIOBANK_LOGGING_LOCAL_ENABLED") {
        if let Ok(enabled) = val.parse() {
            config.logging.local_enabled = enabled;
        }
    }
    if let Ok(val) = std::env::var("BIOBANK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("BIOBANK_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}
