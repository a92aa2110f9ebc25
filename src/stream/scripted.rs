//! Deterministic stream for unit tests.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::stream::MessageStream;

/// One scripted read: wait `delay`, then yield the outcome.
pub(crate) struct Step {
    delay: Duration,
    outcome: io::Result<String>,
}

impl Step {
    pub(crate) fn message(delay_ms: u64, text: &str) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(text.to_string()),
        }
    }

    pub(crate) fn failure(delay_ms: u64, kind: io::ErrorKind, text: &str) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            outcome: Err(io::Error::new(kind, text.to_string())),
        }
    }
}

/// Replays scripted steps, then never yields again.
pub(crate) struct ScriptedStream {
    steps: VecDeque<Step>,
    pub(crate) reads_started: usize,
}

impl ScriptedStream {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            reads_started: 0,
        }
    }

    /// A stream that never delivers anything.
    pub(crate) fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl MessageStream for ScriptedStream {
    type Message = String;
    type Error = io::Error;

    async fn recv_next(&mut self) -> io::Result<String> {
        self.reads_started += 1;
        let Some(delay) = self.steps.front().map(|step| step.delay) else {
            return std::future::pending().await;
        };
        tokio::time::sleep(delay).await;
        match self.steps.pop_front() {
            Some(step) => step.outcome,
            None => std::future::pending().await,
        }
    }
}
