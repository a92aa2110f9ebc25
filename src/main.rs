//! Keep-alive guard server.
//!
//! Accepts WebSocket clients, pings them, and closes every connection whose
//! client stops answering within the keep-alive timeout.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                 ┌──────────────────────────────────────────────┐
//!     ──────────────────────▶│ net::listener → net::ws (handshake)          │
//!                            │        │                                     │
//!                            │        ├── write half ◀── ping ticker        │
//!                            │        └── read half ──▶ health::monitor     │
//!                            │                              │               │
//!                            │                 receive::bounded_receive     │
//!                            │                              │               │
//!     ◀──────────────────────│ close frame ◀── liveness signal fires        │
//!                            └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use keepalive_guard::config::{load_config, GuardConfig};
use keepalive_guard::lifecycle::{signals, Shutdown};
use keepalive_guard::net::{KeepAliveServer, Listener};
use keepalive_guard::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "keepalive-guard")]
#[command(about = "WebSocket server that drops clients which stop answering keep-alives", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("keepalive-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        recv_timeout_ms = config.keepalive.recv_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let listener_config = config.listener.clone();
    let server = KeepAliveServer::new(config)?;
    let listener = Listener::bind(&listener_config).await?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
