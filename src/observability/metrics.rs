//! Metrics collection and exposition.
//!
//! # Metrics
//! - `preload_requests_total` (counter): requests by kind (document, api, asset)
//! - `preload_dispatch_total` (counter): handler outcomes (captured, panicked, timeout, cancelled)
//! - `preload_bundle_duration_seconds` (histogram): time from dispatch to join
//! - `preload_bundle_entries` (histogram): entries per bundle
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter runs its own scrape listener

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_request(kind: &'static str) {
    metrics::counter!("preload_requests_total", "kind" => kind).increment(1);
}

pub fn record_dispatch(outcome: &'static str) {
    metrics::counter!("preload_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_bundle(elapsed: Duration, entries: usize) {
    metrics::histogram!("preload_bundle_duration_seconds").record(elapsed.as_secs_f64());
    metrics::histogram!("preload_bundle_entries").record(entries as f64);
}
