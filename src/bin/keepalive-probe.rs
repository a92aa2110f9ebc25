//! Keep-alive probe.
//!
//! Connects to a WebSocket server and monitors the server's pings. Exits
//! successfully after `--count` keep-alives, or with a failure status as
//! soon as the server goes quiet for longer than `--timeout-ms`.

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use std::process::ExitCode;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use keepalive_guard::config::ObservabilityConfig;
use keepalive_guard::health::{HealthMonitor, StopReason};
use keepalive_guard::net::ws::{self, WsReader};
use keepalive_guard::observability::events::{EventSink, MonitorEvent, TracingSink};
use keepalive_guard::observability::logging;
use keepalive_guard::CancellationToken;

#[derive(Parser)]
#[command(name = "keepalive-probe")]
#[command(about = "Check that a WebSocket server keeps sending keep-alives", long_about = None)]
struct Cli {
    /// Server URL (ws://).
    #[arg(short, long, default_value = "ws://127.0.0.1:8080")]
    url: Url,

    /// Maximum silence between keep-alives in milliseconds.
    #[arg(short, long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Stop successfully after this many keep-alives (0 = run until failure).
    #[arg(short = 'n', long, default_value_t = 3)]
    count: u64,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Logs like [`TracingSink`] and cancels `done` once `target` keep-alives arrived.
struct ProbeSink {
    target: u64,
    done: CancellationToken,
}

impl EventSink for ProbeSink {
    fn record(&self, event: &MonitorEvent) {
        TracingSink.record(event);
        if let MonitorEvent::KeepAliveObserved { count, .. } = event {
            if self.target > 0 && *count >= self.target {
                self.done.cancel();
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let observability = ObservabilityConfig {
        log_level: cli.log_level.clone(),
        ..ObservabilityConfig::default()
    };
    if let Err(e) = logging::init_logging(&observability) {
        eprintln!("failed to initialize logging: {}", e);
    }

    match probe(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(url = %cli.url, error = %e, "Probe failed");
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(true)` when the target number of keep-alives arrived.
async fn probe(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let (websocket, _response) = tokio_tungstenite::connect_async(cli.url.as_str()).await?;
    tracing::info!(url = %cli.url, "Connected");

    let (mut sink, stream) = websocket.split();
    let done = CancellationToken::new();

    let monitor = HealthMonitor::with_timeout(Duration::from_millis(cli.timeout_ms))
        .with_sink(ProbeSink {
            target: cli.count,
            done: done.clone(),
        })
        .spawn(WsReader::new(stream), done.clone(), ws::is_keepalive);

    let termination = monitor.fired().await;
    let healthy = termination.reason == StopReason::Cancelled;

    if healthy {
        tracing::info!(keepalives = termination.keepalives, "Server is alive");
    } else {
        tracing::warn!(
            reason = %termination.reason,
            keepalives = termination.keepalives,
            detail = termination.detail.as_deref().unwrap_or(""),
            "Server stopped sending keep-alives"
        );
    }

    if let Err(e) = sink.send(Message::Close(None)).await {
        tracing::debug!(error = %e, "Failed to send close frame");
    }
    Ok(healthy)
}
