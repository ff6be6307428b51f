//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Bind server to listener
//! - Graceful shutdown on signal or programmatic trigger

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{EditPolicy, ServerConfig};
use crate::groups::setup_groups_router;
use crate::http::request::RequestIdLayer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::store::GroupStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GroupStore>,
    pub edit_policy: EditPolicy,
}

/// HTTP server for the group service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: &ServerConfig, store: Arc<dyn GroupStore>) -> Self {
        let state = AppState {
            store,
            edit_policy: config.auth.edit_policy,
        };

        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        setup_groups_router(state)
            .route("/health", get(health_handler))
            .layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns after Ctrl+C or after `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown.subscribe()))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// Unauthenticated liveness endpoint.
async fn health_handler() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Record request count and latency for every response.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

/// Wait for shutdown: Ctrl+C or a programmatic trigger.
async fn shutdown_signal(mut trigger: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                tracing::info!("Shutdown signal received");
            }
        }
        _ = trigger.recv() => {
            tracing::info!("Shutdown triggered");
        }
    }
}
