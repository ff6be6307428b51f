//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via AppState to all handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AuthConfig;
pub use schema::EditPolicy;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::StoreConfig;
