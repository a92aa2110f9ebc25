//! One-shot liveness signal.
//!
//! # States
//! - Open: the monitored stream is still considered healthy
//! - Fired: the monitor stopped; carries the `Termination` that caused it
//!
//! # State Transitions
//! ```text
//! Open → Fired: first disqualifying receive outcome (exactly once)
//! Fired → Fired: later fire attempts are ignored
//! ```
//!
//! # Design Decisions
//! - Backed by a `watch` channel so any number of observers see the same verdict
//! - The signal carries its stop reason; liveness-only callers ignore it
//! - Dropping the trigger without a verdict fires `Aborted`

use std::fmt;
use tokio::sync::watch;

use crate::receive::ErrorKind;

/// Why a health monitor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The caller's cancellation token fired.
    Cancelled,
    /// No keep-alive arrived within the receive timeout.
    DeadlineExceeded,
    /// The stream failed.
    TransportError,
    /// A message arrived but was not a valid keep-alive.
    ValidationFailed,
    /// The monitor task ended without reaching a verdict (panic or runtime shutdown).
    Aborted,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Cancelled => "cancelled",
            StopReason::DeadlineExceeded => "deadline_exceeded",
            StopReason::TransportError => "transport_error",
            StopReason::ValidationFailed => "validation_failed",
            StopReason::Aborted => "aborted",
        }
    }
}

impl From<ErrorKind> for StopReason {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Cancelled => StopReason::Cancelled,
            ErrorKind::DeadlineExceeded => StopReason::DeadlineExceeded,
            ErrorKind::Transport => StopReason::TransportError,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict delivered when a liveness signal fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub reason: StopReason,
    /// Rendered error, when the stop came from a failed receive.
    pub detail: Option<String>,
    /// Valid keep-alives observed before stopping.
    pub keepalives: u64,
}

impl Termination {
    pub fn new(reason: StopReason, detail: Option<String>, keepalives: u64) -> Self {
        Self {
            reason,
            detail,
            keepalives,
        }
    }

    fn aborted() -> Self {
        Self::new(StopReason::Aborted, None, 0)
    }
}

/// Firing side of a liveness signal. Owned by the monitor task.
#[derive(Debug)]
pub(crate) struct LivenessTrigger {
    tx: watch::Sender<Option<Termination>>,
}

impl LivenessTrigger {
    /// Fire the signal. Returns `false` if it had already fired.
    pub(crate) fn fire(&self, termination: Termination) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(termination);
            true
        })
    }
}

impl Drop for LivenessTrigger {
    fn drop(&mut self) {
        if self.fire(Termination::aborted()) {
            tracing::warn!("Health monitor ended without a verdict");
        }
    }
}

/// Observing side of a liveness signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LivenessSignal {
    rx: watch::Receiver<Option<Termination>>,
}

impl LivenessSignal {
    /// Create a connected trigger/signal pair in the open state.
    pub(crate) fn channel() -> (LivenessTrigger, LivenessSignal) {
        let (tx, rx) = watch::channel(None);
        (LivenessTrigger { tx }, LivenessSignal { rx })
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// The verdict, if the signal has fired.
    pub fn termination(&self) -> Option<Termination> {
        self.rx.borrow().clone()
    }

    /// Wait until the signal fires. Returns immediately if it already has.
    pub async fn fired(&self) -> Termination {
        let mut rx = self.rx.clone();
        let fired = match rx.wait_for(Option::is_some).await {
            Ok(state) => state.clone(),
            Err(_) => None,
        };
        fired.unwrap_or_else(Termination::aborted)
    }
}
