//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing macros (structured log events)
//!     → spans.rs (monitor and connection spans carrying correlation IDs)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Health monitors additionally emit:
//!     → events.rs (MonitorEvent → EventSink)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Monitor and connection IDs live on spans, not on each event
//! - Metrics are cheap (atomic increments)

pub mod events;
pub mod logging;
pub mod metrics;
pub mod spans;

pub use events::{EventSink, MonitorEvent, NoopSink, TracingSink};
