//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_submissions_total` (counter): submissions by route, status
//! - `gateway_submission_duration_seconds` (histogram): latency by route
//! - `gateway_rate_limited_total` (counter): rejected by the request gate
//! - `gateway_security_events_total` (counter): audit events by type
//! - `gateway_mail_dispatch_total` (counter): send outcomes
//! - `gateway_rate_limit_records` (gauge): live rate-limit records
//!
//! Without an installed recorder every call is a no-op, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one submission.
pub fn record_submission(route: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_submissions_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_submission_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(route: &'static str) {
    counter!("gateway_rate_limited_total", "route" => route).increment(1);
}

pub fn record_security_event(event: &'static str) {
    counter!("gateway_security_events_total", "event" => event).increment(1);
}

pub fn record_dispatch(outcome: &'static str) {
    counter!("gateway_mail_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limit_records(count: usize) {
    gauge!("gateway_rate_limit_records").set(count as f64);
}
