//! `MessageStream` for tokio mpsc receivers.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::stream::MessageStream;

/// Every sender of the channel has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel closed: all senders dropped")]
pub struct ChannelClosed;

impl<T: Send> MessageStream for mpsc::Receiver<T> {
    type Message = T;
    type Error = ChannelClosed;

    async fn recv_next(&mut self) -> Result<T, ChannelClosed> {
        self.recv().await.ok_or(ChannelClosed)
    }
}

impl<T: Send> MessageStream for mpsc::UnboundedReceiver<T> {
    type Message = T;
    type Error = ChannelClosed;

    async fn recv_next(&mut self) -> Result<T, ChannelClosed> {
        self.recv().await.ok_or(ChannelClosed)
    }
}
