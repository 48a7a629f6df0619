use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::entities::User;

/// Platform trait - abstraction over the chat service the bot lives in
#[async_trait]
pub trait Platform: Send + Sync {
    /// Deliver a message to a channel
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError>;

    /// Attach an emoji reaction to the message identified by `(channel, timestamp)`
    async fn add_reaction(
        &self,
        name: &str,
        channel: &str,
        timestamp: &str,
    ) -> Result<ReactionResponse, BotError>;

    /// Names of the workspace's custom emoji
    async fn list_custom_emoji(&self) -> Result<Vec<String>, BotError>;

    /// Look up a user by raw id
    async fn get_user(&self, user_id: &str) -> Result<User, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Platform reply to a reaction request
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ReactionResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Why the platform declined a reaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionFailure {
    InvalidName,
    TooManyReactions,
    Other(String),
}

impl ReactionResponse {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn error(code: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(code.into()),
        }
    }

    /// `None` when the reaction was accepted
    pub fn failure(&self) -> Option<ReactionFailure> {
        if self.ok {
            return None;
        }
        Some(match self.error.as_deref() {
            Some("invalid_name") => ReactionFailure::InvalidName,
            Some("too_many_reactions") => ReactionFailure::TooManyReactions,
            Some(other) => ReactionFailure::Other(other.to_string()),
            None => ReactionFailure::Other("unknown".to_string()),
        })
    }
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
}
