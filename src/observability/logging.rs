//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable via RUST_LOG
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - RUST_LOG wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ObservabilityConfig;

/// Initialize the tracing subscriber.
///
/// Must be called once, before the first log event.
pub fn init(config: &ObservabilityConfig) {
    let default_filter = format!(
        "group_service={level},group_server={level},tower_http=info",
        level = config.log_level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
