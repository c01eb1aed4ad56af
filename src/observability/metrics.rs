//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hook_requests_total` (counter): requests by scheme and status code
//! - `hook_request_duration_seconds` (histogram): end-to-end handler latency
//! - `deploys_total` (counter): pipelines by outcome (success, failure, timeout)
//! - `deploy_duration_seconds` (histogram): pipeline duration
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus endpoint is opt-in and binds its own address

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(scheme: &'static str, status: u16, started: Instant) {
    metrics::counter!("hook_requests_total", "scheme" => scheme, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("hook_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record one pipeline run.
pub fn record_deploy(outcome: &'static str, duration: Duration) {
    metrics::counter!("deploys_total", "outcome" => outcome).increment(1);
    metrics::histogram!("deploy_duration_seconds").record(duration.as_secs_f64());
}
