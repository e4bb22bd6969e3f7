//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_http_requests_total` (counter): requests by method, status
//! - `gateway_http_request_duration_seconds` (histogram): latency distribution
//! - `gateway_queue_messages_total` (counter): queue traffic by direction
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - The Prometheus exporter runs its own listener, separate from the API port

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "failed to start metrics exporter"),
    }
}

/// Record one handled HTTP request.
pub fn record_http_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_http_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record queue traffic; `direction` is "published" or "consumed".
pub fn record_queue_message(direction: &'static str) {
    counter!("gateway_queue_messages_total", "direction" => direction).increment(1);
}
