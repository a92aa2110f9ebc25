//! Keep-alive WebSocket server.
//!
//! # Responsibilities
//! - Accept WebSocket clients within the connection limit
//! - Ping each client at a fixed interval
//! - Monitor each client's keep-alives with a `HealthMonitor`
//! - Close a connection once its liveness signal fires
//! - Drain connections on shutdown
//!
//! # Data Flow
//! ```text
//! Listener::accept
//!     → ws::accept (handshake, bounded)
//!     → split: write half ← ping ticker
//!              read half  → HealthMonitor (ws::is_keepalive)
//!     → liveness signal fires
//!     → close frame, connection dropped
//! ```

use std::time::Duration;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{self, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::{validate_config, ConfigError, GuardConfig, KeepAliveConfig};
use crate::health::{HealthMonitor, StopReason, Termination};
use crate::net::connection::{ConnectionId, ConnectionTracker};
use crate::net::listener::{Listener, ListenerError};
use crate::net::ws::{self, HandshakeError, WsReader};
use crate::observability::spans;

/// How long shutdown waits for open connections to close.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Accepts WebSocket clients and drops the ones that stop answering pings.
#[derive(Debug)]
pub struct KeepAliveServer {
    config: GuardConfig,
    tracker: ConnectionTracker,
}

impl KeepAliveServer {
    /// Create a server from a configuration, rejecting invalid settings.
    pub fn new(config: GuardConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(Self {
            config,
            tracker: ConnectionTracker::new(),
        })
    }

    /// Connection tracker shared with every connection task.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Run the accept loop until `shutdown` fires, then drain connections.
    pub async fn run(
        self,
        listener: Listener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(
                address = %addr,
                recv_timeout_ms = self.config.keepalive.recv_timeout_ms,
                ping_interval_ms = self.config.keepalive.ping_interval_ms,
                "Keep-alive server starting"
            );
        }

        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            let (tcp, peer, permit) = match accepted {
                Ok(conn) => conn,
                Err(ListenerError::Accept(e)) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let guard = self.tracker.track();
            let span = spans::connection_span(guard.id(), peer);
            let keepalive = self.config.keepalive.clone();
            let handshake_timeout = self.config.listener.handshake_timeout();
            let cancel = shutdown.child_token();

            let task = async move {
                let _permit = permit;
                let id = guard.id();
                match serve_connection(tcp, id, &keepalive, handshake_timeout, cancel).await {
                    Ok(termination) => {
                        tracing::info!(
                            reason = %termination.reason,
                            keepalives = termination.keepalives,
                            detail = termination.detail.as_deref().unwrap_or(""),
                            "Connection closed"
                        );
                    }
                    Err(e) => tracing::warn!(error = %e, "Handshake failed"),
                }
                drop(guard);
            };
            tokio::spawn(task.instrument(span));
        }

        tracing::info!(
            active_connections = self.tracker.active_count(),
            "Keep-alive server stopping, draining connections"
        );
        if !self.tracker.wait_for_drain(DRAIN_TIMEOUT).await {
            tracing::warn!(
                active_connections = self.tracker.active_count(),
                "Drain timeout elapsed with connections still open"
            );
        }

        tracing::info!("Keep-alive server stopped");
        Ok(())
    }
}

/// Serve one client until its liveness signal fires or a ping cannot be sent.
async fn serve_connection<S>(
    io: S,
    id: ConnectionId,
    keepalive: &KeepAliveConfig,
    handshake_timeout: Duration,
    cancel: CancellationToken,
) -> Result<Termination, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let websocket = ws::accept(io, handshake_timeout).await?;
    let (mut sink, stream) = websocket.split();

    let monitor = HealthMonitor::from_config(keepalive).spawn(
        WsReader::new(stream),
        cancel.clone(),
        ws::is_keepalive,
    );
    tracing::debug!(monitor_id = %monitor.id(), "WebSocket session started");

    let mut ticker = time::interval(keepalive.ping_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let termination = loop {
        tokio::select! {
            termination = monitor.fired() => break termination,
            _ = ticker.tick() => {
                if let Err(e) = sink.send(ws::ping()).await {
                    // The peer is gone; stop the monitor and report the send failure.
                    cancel.cancel();
                    let stopped = monitor.fired().await;
                    break Termination::new(
                        StopReason::TransportError,
                        Some(format!("ping failed: {}", e)),
                        stopped.keepalives,
                    );
                }
            }
        }
    };

    let reader = match monitor.join().await {
        Ok(reader) => reader,
        Err(e) => {
            tracing::error!(connection_id = %id, error = %e, "Health monitor task failed");
            return Ok(termination);
        }
    };

    if let Some(frame) = close_frame(termination.reason) {
        match sink.reunite(reader.into_inner()) {
            Ok(mut websocket) => {
                if let Err(e) = websocket.close(Some(frame)).await {
                    tracing::debug!(error = %e, "Close handshake not completed");
                }
            }
            Err(_) => tracing::error!(connection_id = %id, "WebSocket halves do not match"),
        }
    }

    Ok(termination)
}

/// Close frame sent to the peer for a given stop reason.
///
/// `None` means the transport is unusable and the connection is dropped
/// without a close handshake.
fn close_frame(reason: StopReason) -> Option<CloseFrame> {
    let (code, text) = match reason {
        StopReason::Cancelled => (CloseCode::Away, "server shutting down"),
        StopReason::DeadlineExceeded => (CloseCode::Policy, "keep-alive timeout"),
        StopReason::ValidationFailed => (CloseCode::Policy, "unexpected message"),
        StopReason::TransportError | StopReason::Aborted => return None,
    };
    Some(CloseFrame {
        code,
        reason: text.into(),
    })
}
