//! Console adapter for development/testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, User};
use crate::domain::traits::{BotInfo, Platform, ReactionResponse};

/// Channel id every console message arrives on
pub const CONSOLE_CHANNEL: &str = "console";

/// Distinct reactions one message takes before `too_many_reactions`
pub const DEFAULT_REACTION_LIMIT: usize = 23;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    username: String,
    reaction_limit: usize,
    /// Names already on each message, keyed by timestamp
    reactions: Mutex<HashMap<String, HashSet<String>>>,
}

impl ConsoleAdapter {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: bot_name.into(),
            },
            username: std::env::var("USER").unwrap_or_else(|_| "console".to_string()),
            reaction_limit: DEFAULT_REACTION_LIMIT,
            reactions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_reaction_limit(mut self, limit: usize) -> Self {
        self.reaction_limit = limit;
        self
    }

    /// Feed stdin lines into `tx` until EOF or the receiver goes away
    pub async fn read_lines(&self, tx: mpsc::UnboundedSender<InboundMessage>) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    let message = InboundMessage::new(
                        self.username.clone(),
                        CONSOLE_CHANNEL,
                        line,
                        Self::timestamp(),
                    );
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    }

    /// Seconds.micros, the shape chat platforms use for message timestamps
    fn timestamp() -> String {
        let now = Utc::now();
        format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
    }
}

#[async_trait]
impl Platform for ConsoleAdapter {
    async fn send_message(&self, _channel: &str, text: &str) -> Result<(), BotError> {
        println!("[BOT] {}", text);
        Ok(())
    }

    async fn add_reaction(
        &self,
        name: &str,
        _channel: &str,
        timestamp: &str,
    ) -> Result<ReactionResponse, BotError> {
        let mut reactions = self.reactions.lock().await;
        let on_message = reactions.entry(timestamp.to_string()).or_default();
        if on_message.contains(name) {
            return Ok(ReactionResponse::error("already_reacted"));
        }
        if on_message.len() >= self.reaction_limit {
            return Ok(ReactionResponse::error("too_many_reactions"));
        }
        on_message.insert(name.to_string());
        println!("[BOT] reacted :{}: to {}", name, timestamp);
        Ok(ReactionResponse::ok())
    }

    async fn list_custom_emoji(&self) -> Result<Vec<String>, BotError> {
        Ok(Vec::new())
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BotError> {
        Ok(User::new(user_id).with_username(user_id))
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::ReactionFailure;

    #[tokio::test]
    async fn reactions_stop_at_the_limit_per_message() {
        let console = ConsoleAdapter::new("quip-bot").with_reaction_limit(2);

        assert!(console.add_reaction("tada", CONSOLE_CHANNEL, "1.0").await.unwrap().ok);
        assert!(console.add_reaction("wave", CONSOLE_CHANNEL, "1.0").await.unwrap().ok);
        let third = console.add_reaction("fire", CONSOLE_CHANNEL, "1.0").await.unwrap();
        assert_eq!(third.failure(), Some(ReactionFailure::TooManyReactions));

        // another message has its own budget
        assert!(console.add_reaction("fire", CONSOLE_CHANNEL, "2.0").await.unwrap().ok);
    }

    #[tokio::test]
    async fn repeated_reaction_is_refused_without_using_the_budget() {
        let console = ConsoleAdapter::new("quip-bot").with_reaction_limit(1);

        assert!(console.add_reaction("tada", CONSOLE_CHANNEL, "1.0").await.unwrap().ok);
        let again = console.add_reaction("tada", CONSOLE_CHANNEL, "1.0").await.unwrap();
        assert_eq!(again.failure(), Some(ReactionFailure::Other("already_reacted".into())));
    }
}
