//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_cors_rejections_total` (counter): blocked origins
//! - `gateway_db_connected` (gauge): 1=connected, 0=otherwise
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::db::ConnectionState;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, started: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("gateway_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "method" => method, "status" => status)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_cors_rejection() {
    metrics::counter!("gateway_cors_rejections_total").increment(1);
}

pub fn record_db_state(state: ConnectionState) {
    let connected = if state == ConnectionState::Connected { 1.0 } else { 0.0 };
    metrics::gauge!("gateway_db_connected").set(connected);
}
