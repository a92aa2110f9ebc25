//! Span constructors.
//!
//! # Responsibilities
//! - Create spans for monitor tasks and client connections
//! - Attach correlation IDs once, so every event inside inherits them
//!
//! # Design Decisions
//! - Spans are `info` level; per-receive spans are `trace` (see `receive::bounded`)
//! - Field names match the structured log fields used elsewhere

use std::net::SocketAddr;
use tracing::Span;
use uuid::Uuid;

use crate::net::connection::ConnectionId;

/// Span covering one health monitor task.
pub fn monitor_span(monitor_id: Uuid) -> Span {
    tracing::info_span!("stream_health", monitor_id = %monitor_id)
}

/// Span covering one client connection, from handshake to close.
pub fn connection_span(connection_id: ConnectionId, peer: SocketAddr) -> Span {
    tracing::info_span!("connection", connection_id = %connection_id, peer_addr = %peer)
}
