//! Stream abstraction read by the bounded receiver.
//!
//! # Data Flow
//! ```text
//! Transport (mpsc channel, futures Stream, WebSocket, blocking reader)
//!     → MessageStream::recv_next (one message per call)
//!     → receive::bounded_receive (deadline + cancellation race)
//! ```
//!
//! # Design Decisions
//! - One reader at a time, enforced by `&mut self`
//! - Reads are futures; abandoning an attempt drops the future
//! - Adapters here are cancel-safe: a dropped read never loses a message

pub mod blocking;
pub mod channel;
pub mod reader;
#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;

pub use blocking::{BlockingError, BlockingReader, BlockingRecv};
pub use channel::ChannelClosed;
pub use reader::{StreamError, StreamReader};

/// The receive half of an established duplex connection.
///
/// Implementations yield one message per call. The returned future may be
/// dropped before it completes (deadline or cancellation); implementations
/// should not consume a message they have not returned.
pub trait MessageStream: Send {
    /// Payload produced by one receive call.
    type Message: Send;

    /// Failure reported by the underlying transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Receive the next message from the stream.
    fn recv_next(&mut self) -> impl Future<Output = Result<Self::Message, Self::Error>> + Send;
}
