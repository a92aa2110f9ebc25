//! Keep-alive guard: bounded receives and stream health monitoring.
//!
//! - [`receive::bounded_receive`] reads one message under a deadline and a
//!   cancellation token.
//! - [`health::HealthMonitor`] turns repeated bounded receives into a one-shot
//!   [`health::LivenessSignal`].
//! - [`net::KeepAliveServer`] applies both to WebSocket clients.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod receive;
pub mod stream;

pub use config::GuardConfig;
pub use health::{monitor_stream_health, HealthMonitor, LivenessSignal, StopReason, Termination};
pub use lifecycle::Shutdown;
pub use receive::{bounded_receive, ErrorKind, ReceiveError};
pub use stream::MessageStream;
pub use tokio_util::sync::CancellationToken;
