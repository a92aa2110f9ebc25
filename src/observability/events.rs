//! Monitor event sink.
//!
//! # Responsibilities
//! - Define the discrete events a health monitor emits
//! - Provide the default sink (structured logs + metrics)
//!
//! # Design Decisions
//! - Sinks are synchronous and must not block; the monitor loop calls them inline
//! - No behavior depends on a sink; `NoopSink` is always a valid choice

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::health::Termination;
use crate::observability::metrics;

/// Something a health monitor observed.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Started {
        monitor_id: Uuid,
        recv_timeout: Duration,
    },
    KeepAliveObserved {
        monitor_id: Uuid,
        /// Valid keep-alives so far, including this one.
        count: u64,
    },
    Stopped {
        monitor_id: Uuid,
        termination: Termination,
    },
}

/// Receives monitor events.
pub trait EventSink: Send + Sync + 'static {
    fn record(&self, event: &MonitorEvent);
}

impl<T: EventSink> EventSink for Arc<T> {
    fn record(&self, event: &MonitorEvent) {
        (**self).record(event)
    }
}

/// Logs events with `tracing` and records metrics.
///
/// The monitor ID is not repeated on each event; the monitor task runs
/// inside [`monitor_span`](crate::observability::spans::monitor_span).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &MonitorEvent) {
        match event {
            MonitorEvent::Started { recv_timeout, .. } => {
                tracing::debug!(
                    recv_timeout_ms = recv_timeout.as_millis() as u64,
                    "Stream health monitor started"
                );
            }
            MonitorEvent::KeepAliveObserved { count, .. } => {
                tracing::debug!(count, "Keep-alive received");
                metrics::record_keepalive();
            }
            MonitorEvent::Stopped { termination, .. } => {
                tracing::info!(
                    reason = %termination.reason,
                    keepalives = termination.keepalives,
                    detail = termination.detail.as_deref().unwrap_or(""),
                    "Stream health monitor stopped"
                );
                metrics::record_monitor_stopped(termination.reason.as_str());
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &MonitorEvent) {}
}
