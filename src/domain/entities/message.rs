use serde::{Deserialize, Serialize};

/// An inbound chat event, exactly as the platform delivered it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InboundMessage {
    /// Raw sender id (resolved to a display name by the dispatcher)
    pub sender: String,
    pub channel: String,
    pub text: String,
    /// Opaque platform timestamp, also used to address reactions
    pub timestamp: String,
}

impl InboundMessage {
    pub fn new(
        sender: impl Into<String>,
        channel: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            channel: channel.into(),
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Text with surrounding whitespace removed, which is what rules match against
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// A response waiting to be delivered by the outbound worker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
        }
    }
}
