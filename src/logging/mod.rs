//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local file logs with rotation
//! - Macros for the events the domain layer reports
//!
//! # Example
//!
//! ```no_run
//! use biobank::logging::init_logging;
//! use biobank::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Client started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a state change applied by the server
///
/// # Example
///
/// ```no_run
/// use biobank::log_state_transition;
///
/// log_state_transition!("Shipment", "s1", "created", "packed");
/// ```
#[macro_export]
macro_rules! log_state_transition {
    ($entity:expr, $id:expr, $from:expr, $to:expr) => {
        tracing::info!(
            entity = $entity,
            id = %$id,
            from = %$from,
            to = %$to,
            "State transition"
        );
    };
}

/// Log a server object that failed validation
///
/// # Example
///
/// ```no_run
/// use biobank::log_invalid_server_object;
///
/// log_invalid_server_object!("Shipment", "Shipment.state: missing required property");
/// ```
#[macro_export]
macro_rules! log_invalid_server_object {
    ($schema:expr, $detail:expr) => {
        tracing::error!(
            schema = $schema,
            detail = %$detail,
            "invalid object from server"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use biobank::log_error_with_context;
/// use biobank::domain::BiobankError;
///
/// let error = BiobankError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
