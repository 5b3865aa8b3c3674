//! Configuration management for the biobank client.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BIOBANK_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use biobank::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("biobank.toml")?;
//! println!("Biobank server: {}", config.api.base_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ApiConfig`] - REST server URL, timeouts, bearer token, TLS
//! - [`LoggingConfig`] - JSON log file and its rotation
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://biobank.example.com/api"
//! auth_token = "${BIOBANK_API_TOKEN}"
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/biobank"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{ApiConfig, ApplicationConfig, BiobankConfig, Environment, LoggingConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
