//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that pings are sent faster than the receive timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GuardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("keepalive.ping_interval_ms ({ping_ms}) must be shorter than keepalive.recv_timeout_ms ({timeout_ms})")]
    PingSlowerThanTimeout { ping_ms: u64, timeout_ms: u64 },

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.listener.handshake_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("listener.handshake_timeout_ms"));
    }

    let keepalive = &config.keepalive;
    if keepalive.recv_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("keepalive.recv_timeout_ms"));
    }
    if keepalive.ping_interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration("keepalive.ping_interval_ms"));
    } else if keepalive.ping_interval_ms >= keepalive.recv_timeout_ms {
        errors.push(ValidationError::PingSlowerThanTimeout {
            ping_ms: keepalive.ping_interval_ms,
            timeout_ms: keepalive.recv_timeout_ms,
        });
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
