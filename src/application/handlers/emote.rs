//! Emote responder - replies with a random phrase from one category

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::messaging::context::{Context, Handler, HandlerResult, Outcome};
use crate::application::messaging::{PolicyLimits, ResponseSender};
use crate::domain::traits::ResourceStore;

/// Rate limit and probability of one category, read from the emote table per call
pub struct EmoteLimits {
    key: String,
    resources: Arc<dyn ResourceStore>,
}

impl EmoteLimits {
    pub fn new(key: impl Into<String>, resources: Arc<dyn ResourceStore>) -> Self {
        Self {
            key: key.into(),
            resources,
        }
    }
}

#[async_trait]
impl PolicyLimits for EmoteLimits {
    async fn probability(&self) -> Result<u32, BotError> {
        Ok(self.resources.load_emotes().await?.probability(&self.key))
    }

    async fn interval(&self) -> Result<Duration, BotError> {
        Ok(Duration::from_secs(self.resources.load_emotes().await?.rate_limit(&self.key)))
    }
}

pub struct EmoteResponder {
    key: String,
    resources: Arc<dyn ResourceStore>,
    sender: ResponseSender,
}

impl EmoteResponder {
    pub fn new(key: impl Into<String>, resources: Arc<dyn ResourceStore>, sender: ResponseSender) -> Self {
        Self {
            key: key.into(),
            resources,
            sender,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Handler for EmoteResponder {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        // Fresh read every time; edits to the table apply on the next message.
        let table = self.resources.load_emotes().await?;
        let phrase = table.phrases(&self.key).choose(&mut rand::thread_rng()).cloned();

        let Some(phrase) = phrase else {
            tracing::warn!("[{}] emote category {} has no phrases", ctx.channel(), self.key);
            return Ok(Outcome::Skipped);
        };
        self.sender.send(ctx.channel(), phrase)?;
        Ok(Outcome::Responded)
    }
}
