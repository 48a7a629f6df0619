//! Response sender - the single way handlers talk back to a channel

use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::OutboundMessage;

/// Enqueues outbound messages for the platform worker.
///
/// Sending never waits on network I/O; the worker on the other end of the
/// channel does the delivery.
#[derive(Debug, Clone)]
pub struct ResponseSender {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ResponseSender {
    pub fn new(tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self { tx }
    }

    /// Sender plus the receiving half the outbound worker drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send(&self, channel: &str, text: impl Into<String>) -> Result<(), BotError> {
        let message = OutboundMessage::new(channel, text);
        tracing::debug!("[{}] queueing: {}", message.channel, preview(&message.text));
        self.tx.send(message).map_err(|_| BotError::ChannelClosed)
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_enqueues_without_blocking() {
        let (sender, mut rx) = ResponseSender::channel();
        sender.send("C1", "hello").unwrap();
        sender.send("C2", String::from("world")).unwrap();

        assert_eq!(rx.try_recv().unwrap(), OutboundMessage::new("C1", "hello"));
        assert_eq!(rx.try_recv().unwrap(), OutboundMessage::new("C2", "world"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_fails_once_worker_is_gone() {
        let (sender, rx) = ResponseSender::channel();
        drop(rx);
        assert!(matches!(sender.send("C1", "hello"), Err(BotError::ChannelClosed)));
    }
}
