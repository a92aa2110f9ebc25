//! `MessageStream` over a synchronous, blocking receive primitive.
//!
//! # Responsibilities
//! - Run the blocking read on tokio's blocking pool
//! - Keep at most one read in flight
//! - Hand an abandoned read's result to the next caller
//!
//! # Design Decisions
//! - A blocking read cannot be interrupted. When a receive attempt is
//!   abandoned (deadline or cancellation), the read stays parked in the
//!   adapter and the next `recv_next` waits on it instead of starting a
//!   second read, so no message is consumed without being returned.
//! - If the primitive never returns, its blocking thread stays occupied
//!   until the process exits. This is the accepted cost of wrapping a
//!   transport that cannot observe cancellation itself.

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::stream::MessageStream;

/// A synchronous receive primitive, e.g. a blocking socket or pipe reader.
pub trait BlockingRecv: Send + 'static {
    type Message: Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Block the current thread until the next message or a failure.
    fn recv_blocking(&mut self) -> Result<Self::Message, Self::Error>;
}

/// Errors from a [`BlockingReader`].
#[derive(Debug, Error)]
pub enum BlockingError<E> {
    /// The primitive itself failed.
    #[error("blocking read failed: {0}")]
    Transport(#[source] E),

    /// The read task panicked or was cancelled by runtime shutdown.
    #[error("blocking read task failed: {0}")]
    Join(#[source] JoinError),

    /// A previous read task failed and took the reader with it.
    #[error("blocking reader lost after a failed read task")]
    Poisoned,
}

type PendingRead<R> =
    JoinHandle<(R, Result<<R as BlockingRecv>::Message, <R as BlockingRecv>::Error>)>;

/// Adapts a [`BlockingRecv`] into an async, cancel-safe [`MessageStream`].
pub struct BlockingReader<R: BlockingRecv> {
    /// The reader, present whenever no read is in flight.
    reader: Option<R>,
    /// The in-flight read, including one abandoned by a previous caller.
    pending: Option<PendingRead<R>>,
}

impl<R: BlockingRecv> BlockingReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            pending: None,
        }
    }

    /// Whether a read started by an earlier call is still outstanding.
    pub fn has_pending_read(&self) -> bool {
        self.pending.is_some()
    }

    /// Recover the reader. Returns `None` while a read is in flight or after
    /// a read task failed.
    pub fn into_inner(self) -> Option<R> {
        if self.pending.is_some() {
            return None;
        }
        self.reader
    }
}

impl<R: BlockingRecv> MessageStream for BlockingReader<R> {
    type Message = R::Message;
    type Error = BlockingError<R::Error>;

    async fn recv_next(&mut self) -> Result<R::Message, BlockingError<R::Error>> {
        if self.pending.is_none() {
            let mut reader = self.reader.take().ok_or(BlockingError::Poisoned)?;
            self.pending = Some(tokio::task::spawn_blocking(move || {
                let result = reader.recv_blocking();
                (reader, result)
            }));
        } else {
            tracing::trace!("Resuming read abandoned by a previous attempt");
        }

        let Some(pending) = self.pending.as_mut() else {
            return Err(BlockingError::Poisoned);
        };

        // Dropping this future here leaves `pending` in place for the next call.
        let joined = pending.await;
        self.pending = None;

        match joined {
            Ok((reader, result)) => {
                self.reader = Some(reader);
                result.map_err(BlockingError::Transport)
            }
            Err(e) => {
                tracing::error!(error = %e, "Blocking read task failed");
                Err(BlockingError::Join(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Blocking reader fed from a std channel.
    struct ChannelRecv(mpsc::Receiver<io::Result<String>>);

    impl BlockingRecv for ChannelRecv {
        type Message = String;
        type Error = io::Error;

        fn recv_blocking(&mut self) -> io::Result<String> {
            self.0
                .recv()
                .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "sender gone"))?
        }
    }

    #[tokio::test]
    async fn reads_messages() {
        let (tx, rx) = mpsc::channel();
        let mut reader = BlockingReader::new(ChannelRecv(rx));

        tx.send(Ok("hello".to_string())).unwrap();
        assert_eq!(reader.recv_next().await.unwrap(), "hello");
        assert!(!reader.has_pending_read());
        assert!(reader.into_inner().is_some());
    }

    #[tokio::test]
    async fn abandoned_read_is_resumed() {
        let (tx, rx) = mpsc::channel();
        let mut reader = BlockingReader::new(ChannelRecv(rx));

        let attempt = tokio::time::timeout(Duration::from_millis(20), reader.recv_next()).await;
        assert!(attempt.is_err(), "nothing was sent yet");
        assert!(reader.has_pending_read());

        tx.send(Ok("late".to_string())).unwrap();
        assert_eq!(reader.recv_next().await.unwrap(), "late");
        assert!(!reader.has_pending_read());
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let (tx, rx) = mpsc::channel();
        let mut reader = BlockingReader::new(ChannelRecv(rx));

        tx.send(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")))
            .unwrap();
        match reader.recv_next().await {
            Err(BlockingError::Transport(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
                assert_eq!(e.to_string(), "pipe closed");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        // The reader survives a transport error.
        tx.send(Ok("again".to_string())).unwrap();
        assert_eq!(reader.recv_next().await.unwrap(), "again");
    }
}
