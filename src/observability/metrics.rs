//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): proxied requests by status, backend
//! - `relay_request_duration_seconds` (histogram): latency by backend
//! - `relay_live_backends` (gauge): size of the router's live set
//! - `relay_change_events_total` (counter): subscriber outcomes
//! - `relay_backend_health` (gauge): 1=healthy, 0=unhealthy, per backend
//! - `relay_health_cycle_duration_seconds` (histogram): orchestrator sweeps
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished client request.
pub fn record_request(status: u16, backend: &str, start: Instant) {
    counter!(
        "relay_requests_total",
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_live_backends(count: usize) {
    gauge!("relay_live_backends").set(count as f64);
}

/// Outcome of one change event: `added`, `removed`, `noop`, `dropped`, `malformed`.
pub fn record_change_event(outcome: &'static str) {
    counter!("relay_change_events_total", "outcome" => outcome).increment(1);
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("relay_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_health_cycle(elapsed: Duration) {
    histogram!("relay_health_cycle_duration_seconds").record(elapsed.as_secs_f64());
}
