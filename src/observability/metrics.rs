//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (request counts, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `groups_requests_total` (counter): total requests by method, status
//! - `groups_request_duration_seconds` (histogram): latency distribution

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            describe_counter!(
                "groups_requests_total",
                "Total requests handled, by method and status"
            );
            describe_histogram!(
                "groups_request_duration_seconds",
                "Request latency in seconds"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("groups_requests_total", &labels).increment(1);
    histogram!("groups_request_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}
