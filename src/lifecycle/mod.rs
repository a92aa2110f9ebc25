//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed token cancels
//!     → server stops accepting
//!     → connection monitors observe cancellation and close
//! ```
//!
//! # Design Decisions
//! - Shutdown is a cancellation token tree, passed explicitly to every task
//! - Shutdown has timeout: connections get a bounded drain period

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
