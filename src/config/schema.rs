//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the group
//! service. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the group service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, request limits).
    pub listener: ListenerConfig,

    /// Authorization policy settings.
    pub auth: AuthConfig,

    /// Store backend settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Who may create, edit, and delete groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// Members and administrators may edit groups. Guests never can.
    #[default]
    Members,

    /// Only administrators may edit groups.
    Admins,
}

/// Authorization policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Group edit policy for non-admin callers.
    pub edit_policy: EditPolicy,
}

/// Store backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to a TOML seed file describing users and initial groups.
    /// When absent the service starts with an empty store.
    pub seed_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
