//! Keep-alive health monitoring.
//!
//! # Responsibilities
//! - Repeatedly receive from a stream with a fixed keep-alive timeout
//! - Classify each message with the caller's validity predicate
//! - Fire the liveness signal on the first disqualifying outcome

use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::schema::{KeepAliveConfig, DEFAULT_RECV_TIMEOUT};
use crate::health::signal::{LivenessSignal, LivenessTrigger, StopReason, Termination};
use crate::observability::events::{EventSink, MonitorEvent, TracingSink};
use crate::observability::spans;
use crate::receive::bounded_receive;
use crate::stream::MessageStream;

/// Spawns keep-alive monitors for streams.
#[derive(Debug, Clone)]
pub struct HealthMonitor<K = TracingSink> {
    recv_timeout: Duration,
    sink: K,
}

impl HealthMonitor {
    /// Monitor with the default 10 second receive timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_RECV_TIMEOUT)
    }

    pub fn with_timeout(recv_timeout: Duration) -> Self {
        Self {
            recv_timeout,
            sink: TracingSink,
        }
    }

    pub fn from_config(config: &KeepAliveConfig) -> Self {
        Self::with_timeout(config.recv_timeout())
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EventSink> HealthMonitor<K> {
    /// Replace the event sink.
    pub fn with_sink<K2: EventSink>(self, sink: K2) -> HealthMonitor<K2> {
        HealthMonitor {
            recv_timeout: self.recv_timeout,
            sink,
        }
    }

    pub fn recv_timeout(&self) -> Duration {
        self.recv_timeout
    }

    /// Start monitoring `stream` on a new task and return immediately.
    ///
    /// The task reads until a receive fails (cancelled, timed out, transport
    /// error) or `is_valid` rejects a message, then fires the liveness signal
    /// once and hands the stream back through [`MonitorHandle::join`].
    pub fn spawn<S, F>(self, stream: S, cancel: CancellationToken, is_valid: F) -> MonitorHandle<S>
    where
        S: MessageStream + 'static,
        F: Fn(&S::Message) -> bool + Send + 'static,
    {
        let id = Uuid::new_v4();
        let (trigger, signal) = LivenessSignal::channel();
        let watch = self.watch(id, stream, cancel, is_valid, trigger);
        let task = tokio::spawn(watch.instrument(spans::monitor_span(id)));

        MonitorHandle { id, signal, task }
    }

    async fn watch<S, F>(
        self,
        id: Uuid,
        mut stream: S,
        cancel: CancellationToken,
        is_valid: F,
        trigger: LivenessTrigger,
    ) -> S
    where
        S: MessageStream,
        F: Fn(&S::Message) -> bool,
    {
        self.sink.record(&MonitorEvent::Started {
            monitor_id: id,
            recv_timeout: self.recv_timeout,
        });

        let mut keepalives = 0u64;
        let termination = loop {
            match bounded_receive(&mut stream, self.recv_timeout, &cancel).await {
                Ok(message) if is_valid(&message) => {
                    keepalives += 1;
                    self.sink.record(&MonitorEvent::KeepAliveObserved {
                        monitor_id: id,
                        count: keepalives,
                    });
                }
                Ok(_) => {
                    break Termination::new(StopReason::ValidationFailed, None, keepalives);
                }
                Err(e) => {
                    break Termination::new(e.kind().into(), Some(e.to_string()), keepalives);
                }
            }
        };

        self.sink.record(&MonitorEvent::Stopped {
            monitor_id: id,
            termination: termination.clone(),
        });
        trigger.fire(termination);
        stream
    }
}

/// Handle to a running monitor.
#[derive(Debug)]
pub struct MonitorHandle<S> {
    id: Uuid,
    signal: LivenessSignal,
    task: JoinHandle<S>,
}

impl<S> MonitorHandle<S> {
    /// Identifier attached to this monitor's events and logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// A clone of the liveness signal, for observers that outlive the handle.
    pub fn signal(&self) -> LivenessSignal {
        self.signal.clone()
    }

    pub fn is_fired(&self) -> bool {
        self.signal.is_fired()
    }

    /// Wait for the liveness signal.
    pub async fn fired(&self) -> Termination {
        self.signal.fired().await
    }

    /// Wait for the monitor task to finish and take the stream back.
    ///
    /// The signal has always fired by the time this returns `Ok`.
    pub async fn join(self) -> Result<S, JoinError> {
        self.task.await
    }
}

/// Monitor `stream` with the default timeout and the tracing sink.
///
/// Returns a handle whose liveness signal fires once `stream` stops
/// delivering valid keep-alives.
pub fn monitor_stream_health<S, F>(
    stream: S,
    cancel: CancellationToken,
    is_valid: F,
) -> MonitorHandle<S>
where
    S: MessageStream + 'static,
    F: Fn(&S::Message) -> bool + Send + 'static,
{
    HealthMonitor::new().spawn(stream, cancel, is_valid)
}
