//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keepalive_receive_duration_seconds` (histogram): time per receive, by outcome
//! - `keepalive_observed_total` (counter): valid keep-alives
//! - `keepalive_monitor_stopped_total` (counter): monitor stops, by reason
//! - `keepalive_connections_total` (counter): accepted WebSocket connections
//! - `keepalive_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so the library never requires an exporter
//! - The Prometheus exporter is installed by binaries only

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_receive(outcome: &'static str, elapsed: Duration) {
    histogram!("keepalive_receive_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

pub fn record_keepalive() {
    counter!("keepalive_observed_total").increment(1);
}

pub fn record_monitor_stopped(reason: &'static str) {
    counter!("keepalive_monitor_stopped_total", "reason" => reason).increment(1);
}

pub fn record_connection_opened() {
    counter!("keepalive_connections_total").increment(1);
    gauge!("keepalive_active_connections").increment(1.0);
}

pub fn record_connection_closed() {
    gauge!("keepalive_active_connections").decrement(1.0);
}
