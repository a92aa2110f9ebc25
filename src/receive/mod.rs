//! Bounded receive subsystem.
//!
//! # Data Flow
//! ```text
//! bounded_receive(stream, deadline, cancel)
//!     → one read via MessageStream::recv_next
//!     → race: read completes | cancel fires | deadline elapses
//!     → Ok(message) | Cancelled | DeadlineExceeded | Transport(e)
//! ```
//!
//! # Design Decisions
//! - Every receive has a deadline; deadlines are per attempt, never cumulative
//! - Cancellation is an explicit token argument, observed but never fired here
//! - Losing races drop the read future instead of detaching a task
//! - Transport errors are forwarded unmodified

pub mod bounded;
pub mod types;

pub use bounded::{bounded_receive, bounded_receive_default};
pub use types::{ErrorKind, ReceiveError, ReceiveResult};
