//! One-way recorder -> host channel.

use tokio::sync::mpsc;

/// Fire-and-forget delivery of serialized messages to the host.
///
/// Implementations never block and never report delivery; a closed host
/// simply drops the message.
pub trait HostChannel: Send + Sync {
    fn post(&self, payload: String);
}

impl<T: HostChannel + ?Sized> HostChannel for std::sync::Arc<T> {
    fn post(&self, payload: String) {
        (**self).post(payload)
    }
}

/// In-process channel backed by an unbounded tokio mpsc queue.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSender {
    /// Create a sender and the receiving end the host drains.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl HostChannel for ChannelSender {
    fn post(&self, payload: String) {
        let _ = self.tx.send(payload);
    }
}
