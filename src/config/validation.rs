//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check addresses parse as socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic validation failure, tied to a config field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration, collecting every semantic error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a valid socket address: {}", config.listener.bind_address),
        ));
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "listener.max_body_bytes",
            "must be greater than zero",
        ));
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unrecognized level: {}", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
        ));
    }

    if let Some(path) = &config.store.seed_path {
        if path.trim().is_empty() {
            errors.push(ValidationError::new("store.seed_path", "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
