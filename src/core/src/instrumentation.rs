//! Custom instrumentation hooks.
//!
//! Thin wrappers over the `metrics` facade so handlers never talk to a
//! specific APM agent. Whatever recorder the process installs (Prometheus
//! exporter, vendor agent bridge, nothing at all) receives these events; with
//! no recorder installed every call is a no-op.
//!
//! # Metrics
//! - `http.requests` (counter): requests by method and status
//! - `http.request_duration_seconds` (histogram): latency by method and status
//! - `errors.noticed` (counter): faults reported through [`notice_error`]
//! - `custom.attributes` (counter): custom attributes by key
//! - arbitrary `custom.*` histograms/counters recorded by handlers

use log::{error, info};
use std::time::Duration;

pub fn record_metric(name: &'static str, value: f64) {
    metrics::histogram!(name).record(value);
}

pub fn increment_counter(name: &'static str) {
    metrics::counter!(name).increment(1);
}

/// Attaches a key/value pair to the current request.
///
/// The pair is written to the log (the request line is the closest thing to a
/// transaction we have) and counted per key.
pub fn add_custom_attribute(key: &'static str, value: &str) {
    info!("custom attribute {}={}", key, value);
    metrics::counter!("custom.attributes", "key" => key).increment(1);
}

/// Reports a fault that escaped normal handling.
pub fn notice_error(err: &dyn std::error::Error) {
    error!("Unhandled error: {}", err);
    metrics::counter!("errors.noticed").increment(1);
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("http.requests", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    metrics::histogram!(
        "http.request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(elapsed.as_secs_f64());
}
