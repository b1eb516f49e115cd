//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method, status, mount
//! - `dispatch_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder the calls are no-ops
//! - Recorded by a middleware outside the body-limit and timeout layers,
//!   so rejected and timed-out requests are counted too
//! - Labels are bounded: the mount is a known mount name or `none`, the
//!   method is one of the four routable verbs or `other`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resource::Verb;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &Method, status: u16, mount: &str, start: Instant) {
    let labels = [
        ("method", method_label(method).to_string()),
        ("status", status.to_string()),
        ("mount", mount.to_string()),
    ];
    metrics::counter!("dispatch_requests_total", &labels).increment(1);
    metrics::histogram!("dispatch_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Verb name for the four routable methods, `other` for anything else.
pub fn method_label(method: &Method) -> &'static str {
    Verb::from_method(method).map_or("other", |verb| verb.as_str())
}
