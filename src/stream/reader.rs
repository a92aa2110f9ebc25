//! `MessageStream` over any `futures` stream of results.

use futures_util::{Stream, StreamExt};
use thiserror::Error;

use crate::stream::MessageStream;

/// Errors from a [`StreamReader`].
#[derive(Debug, Error)]
pub enum StreamError<E> {
    /// The stream yielded `None`; no further messages will arrive.
    #[error("stream ended")]
    Closed,

    /// The stream yielded an error item.
    #[error("transport error: {0}")]
    Transport(#[source] E),
}

impl<E> StreamError<E> {
    /// The transport error, if this is one.
    pub fn transport(&self) -> Option<&E> {
        match self {
            StreamError::Transport(e) => Some(e),
            StreamError::Closed => None,
        }
    }
}

/// Reads one item at a time from a `Stream<Item = Result<M, E>>`.
#[derive(Debug)]
pub struct StreamReader<S> {
    inner: S,
}

impl<S> StreamReader<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, M, E> MessageStream for StreamReader<S>
where
    S: Stream<Item = Result<M, E>> + Unpin + Send,
    M: Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Message = M;
    type Error = StreamError<E>;

    async fn recv_next(&mut self) -> Result<M, StreamError<E>> {
        match self.inner.next().await {
            Some(Ok(message)) => Ok(message),
            Some(Err(e)) => Err(StreamError::Transport(e)),
            None => Err(StreamError::Closed),
        }
    }
}
