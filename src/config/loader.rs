//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the config schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but failed semantic validation.
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9100"

            [auth]
            edit_policy = "admins"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");
        assert_eq!(config.auth.edit_policy, crate::config::schema::EditPolicy::Admins);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.listener.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "not-an-address"
            "#
        )
        .unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors[0].field, "listener.bind_address");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
