//! Stream health monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! HealthMonitor::spawn(stream, cancel, is_valid)
//!     → monitor task loops:
//!         bounded_receive(stream, recv_timeout, cancel)
//!         → valid keep-alive: emit event, loop
//!         → invalid message / any receive error: stop
//!     → signal.rs fires the LivenessSignal exactly once
//!     → stream handed back via MonitorHandle::join
//! ```
//!
//! # Design Decisions
//! - A single disqualifying outcome stops the monitor; there is no retry budget
//! - The receive timeout is per attempt and resets every iteration
//! - The signal carries the stop reason; liveness-only callers can ignore it
//! - Monitors never block their caller

pub mod monitor;
pub mod signal;

pub use monitor::{monitor_stream_health, HealthMonitor, MonitorHandle};
pub use signal::{LivenessSignal, StopReason, Termination};
