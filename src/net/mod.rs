//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (lifecycle tracking)
//!     → ws.rs (WebSocket handshake, frame classification)
//!     → server.rs (ping loop + health monitor per connection)
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - One health monitor per connection; its signal decides when to close

pub mod connection;
pub mod listener;
pub mod server;
pub mod ws;

pub use listener::Listener;
pub use server::{KeepAliveServer, ServerError};
