//! WebSocket transport for keep-alive monitoring.
//!
//! # Responsibilities
//! - Complete the server-side handshake under a timeout
//! - Expose the read half of a connection as a `MessageStream`
//! - Classify frames as keep-alives
//!
//! # Design Decisions
//! - Ping and pong frames both count as keep-alives
//! - Text, binary and close frames are not keep-alives
//! - Pong replies to peer pings are sent by tungstenite while reading

use std::time::Duration;
use futures_util::stream::SplitStream;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::WebSocketStream;

use crate::stream::{StreamError, StreamReader};

/// Read half of a WebSocket connection as a [`MessageStream`](crate::stream::MessageStream).
pub type WsReader<S> = StreamReader<SplitStream<WebSocketStream<S>>>;

/// Errors produced by a [`WsReader`].
pub type WsReadError = StreamError<tungstenite::Error>;

/// Errors establishing a WebSocket session.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("WebSocket handshake timed out after {0:?}")]
    Timeout(Duration),

    #[error("WebSocket handshake failed: {0}")]
    Protocol(#[from] tungstenite::Error),
}

/// Whether `message` is a keep-alive frame.
pub fn is_keepalive(message: &Message) -> bool {
    matches!(message, Message::Ping(_) | Message::Pong(_))
}

/// An empty ping frame.
pub fn ping() -> Message {
    Message::Ping(Vec::new().into())
}

/// Accept a WebSocket upgrade on an established connection.
pub async fn accept<S>(
    stream: S,
    handshake_timeout: Duration,
) -> Result<WebSocketStream<S>, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(handshake_timeout, tokio_tungstenite::accept_async(stream)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(HandshakeError::Timeout(handshake_timeout)),
    }
}
