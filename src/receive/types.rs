//! Receive outcome classification.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result of a single bounded receive.
pub type ReceiveResult<M, E> = Result<M, ReceiveError<E>>;

/// Kind of a failed receive, for branching without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Cancelled,
    DeadlineExceeded,
    Transport,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::Transport => "transport_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from a bounded receive attempt.
#[derive(Debug, Error)]
pub enum ReceiveError<E> {
    /// The cancellation token fired before a message arrived.
    #[error("receive cancelled")]
    Cancelled,

    /// No message arrived within the attempt's deadline.
    #[error("timeout receiving message after {0:?}")]
    DeadlineExceeded(Duration),

    /// The stream itself failed.
    #[error("transport error: {0}")]
    Transport(#[source] E),
}

impl<E> ReceiveError<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReceiveError::Cancelled => ErrorKind::Cancelled,
            ReceiveError::DeadlineExceeded(_) => ErrorKind::DeadlineExceeded,
            ReceiveError::Transport(_) => ErrorKind::Transport,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReceiveError::Cancelled)
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, ReceiveError::DeadlineExceeded(_))
    }

    /// Borrow the transport error, if any.
    pub fn transport(&self) -> Option<&E> {
        match self {
            ReceiveError::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Take ownership of the transport error, if any.
    pub fn into_transport(self) -> Option<E> {
        match self {
            ReceiveError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
