//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Durations are stored as milliseconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a single keep-alive receive attempt.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// Root configuration for the keep-alive guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Keep-alive monitoring settings.
    pub keepalive: KeepAliveConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Time allowed for the WebSocket handshake in milliseconds.
    pub handshake_timeout_ms: u64,
}

impl ListenerConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
            handshake_timeout_ms: 5_000,
        }
    }
}

/// Keep-alive configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct KeepAliveConfig {
    /// Maximum wait for each keep-alive message in milliseconds.
    pub recv_timeout_ms: u64,

    /// Interval between pings sent to peers in milliseconds.
    /// Must be shorter than `recv_timeout_ms`.
    pub ping_interval_ms: u64,
}

impl KeepAliveConfig {
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            recv_timeout_ms: DEFAULT_RECV_TIMEOUT.as_millis() as u64,
            ping_interval_ms: 3_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
