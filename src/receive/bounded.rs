//! Time- and cancellation-bounded receive.

use std::time::Duration;
use tokio::task;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::config::schema::DEFAULT_RECV_TIMEOUT;
use crate::observability::metrics;
use crate::receive::types::{ErrorKind, ReceiveError, ReceiveResult};
use crate::stream::MessageStream;

/// Receive exactly one message from `stream`, bounded by `deadline` and `cancel`.
///
/// Starts one read and returns on the first of:
/// - the read completing (`Ok(message)` or `ReceiveError::Transport`),
/// - `cancel` firing (`ReceiveError::Cancelled`),
/// - `deadline` elapsing (`ReceiveError::DeadlineExceeded`).
///
/// A token that has already fired returns `Cancelled` without touching the
/// stream. Cancellation wins over a ready message and over a deadline that
/// elapses in the same instant; a ready message wins over the deadline.
/// A losing read is dropped; see [`MessageStream`] for what that means for
/// the stream.
#[tracing::instrument(
    level = "trace",
    name = "bounded_receive",
    skip_all,
    fields(deadline_ms = deadline.as_millis() as u64, outcome)
)]
pub async fn bounded_receive<S>(
    stream: &mut S,
    deadline: Duration,
    cancel: &CancellationToken,
) -> ReceiveResult<S::Message, S::Error>
where
    S: MessageStream,
{
    if cancel.is_cancelled() {
        Span::current().record("outcome", ErrorKind::Cancelled.as_str());
        tracing::trace!("Receive skipped: already cancelled");
        return Err(ReceiveError::Cancelled);
    }

    let started = Instant::now();

    let outcome = tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(ReceiveError::Cancelled),
        result = stream.recv_next() => result.map_err(ReceiveError::Transport),
        _ = time::sleep(deadline) => {
            // Timers due at the same instant wake together; let a canceller
            // woken alongside this task run before settling on a timeout.
            task::yield_now().await;
            if cancel.is_cancelled() {
                Err(ReceiveError::Cancelled)
            } else {
                Err(ReceiveError::DeadlineExceeded(deadline))
            }
        }
    };

    let elapsed = started.elapsed();
    match &outcome {
        Ok(_) => {
            Span::current().record("outcome", "message");
            tracing::trace!(elapsed_ms = elapsed.as_millis() as u64, "Message received");
            metrics::record_receive("message", elapsed);
        }
        Err(e) => {
            Span::current().record("outcome", e.kind().as_str());
            tracing::trace!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "Receive failed"
            );
            metrics::record_receive(e.kind().as_str(), elapsed);
        }
    }

    outcome
}

/// [`bounded_receive`] with the default keep-alive timeout (10 seconds).
pub async fn bounded_receive_default<S>(
    stream: &mut S,
    cancel: &CancellationToken,
) -> ReceiveResult<S::Message, S::Error>
where
    S: MessageStream,
{
    bounded_receive(stream, DEFAULT_RECV_TIMEOUT, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::scripted::{ScriptedStream, Step};
    use std::io;

    const DEADLINE: Duration = Duration::from_millis(50);

    #[tokio::test(start_paused = true)]
    async fn message_before_deadline() {
        let mut stream = ScriptedStream::new(vec![Step::message(10, "ping")]);
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let message = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap();

        assert_eq!(message, "ping");
        assert!(started.elapsed() < DEADLINE);
        assert_eq!(stream.reads_started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_arrives_before_deadline() {
        let mut stream = ScriptedStream::silent();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let err = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        let elapsed = started.elapsed();
        assert!(elapsed >= DEADLINE, "returned early after {:?}", elapsed);
        assert!(elapsed < DEADLINE + Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn late_message_is_a_timeout() {
        let mut stream = ScriptedStream::new(vec![Step::message(80, "too late")]);
        let cancel = CancellationToken::new();

        let err = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap_err();

        assert!(err.is_deadline_exceeded());
        // The read was dropped before it consumed the scripted message.
        assert_eq!(stream.remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_before_deadline() {
        let mut stream = ScriptedStream::silent();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(5)).await;
            trigger.cancel();
        });
        let started = Instant::now();

        let err = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(5));
        assert!(elapsed < Duration::from_millis(10), "cancel took {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_at_the_deadline_wins() {
        let mut stream = ScriptedStream::silent();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(DEADLINE).await;
            trigger.cancel();
        });
        let started = Instant::now();

        let err = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        let elapsed = started.elapsed();
        assert!(elapsed >= DEADLINE);
        assert!(elapsed < DEADLINE + Duration::from_millis(5), "cancel took {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn message_at_the_deadline_wins() {
        let mut stream = ScriptedStream::new(vec![Step::message(50, "just in time")]);
        let cancel = CancellationToken::new();

        let message = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap();

        assert_eq!(message, "just in time");
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_skips_the_read() {
        let mut stream = ScriptedStream::new(vec![Step::message(0, "ready")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(stream.reads_started, 0);
        assert_eq!(stream.remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_is_forwarded() {
        let mut stream = ScriptedStream::new(vec![Step::failure(
            10,
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )]);
        let cancel = CancellationToken::new();

        let err = bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(
            err.transport().map(io::Error::kind),
            Some(io::ErrorKind::ConnectionReset)
        );
        let inner = err.into_transport().unwrap();
        assert_eq!(inner.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(inner.to_string(), "connection reset by peer");
    }

    #[tokio::test(start_paused = true)]
    async fn default_deadline_is_ten_seconds() {
        let mut stream = ScriptedStream::silent();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let err = bounded_receive_default(&mut stream, &cancel).await.unwrap_err();

        assert!(err.is_deadline_exceeded());
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn each_attempt_gets_a_fresh_deadline() {
        let mut stream = ScriptedStream::new(vec![
            Step::message(40, "one"),
            Step::message(40, "two"),
        ]);
        let cancel = CancellationToken::new();

        assert_eq!(bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap(), "one");
        assert_eq!(bounded_receive(&mut stream, DEADLINE, &cancel).await.unwrap(), "two");
    }
}
