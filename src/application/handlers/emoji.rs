//! Emoji reactions with a self-healing list of names

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::application::messaging::context::{Context, Handler, HandlerResult, Outcome};
use crate::domain::entities::EmojiNameSet;
use crate::domain::traits::{Platform, ReactionFailure, ReactionResponse, ResourceStore};

/// What came of one reaction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub response: ReactionResponse,
    /// The name was rejected and dropped from the on-file list
    pub removed: bool,
}

/// Owner of the on-file emoji list.
///
/// Every write goes through `invalidate`, which holds one lock across the
/// load, remove and save so two handlers cannot lose each other's removals.
pub struct EmojiCatalog {
    resources: Arc<dyn ResourceStore>,
    platform: Arc<dyn Platform>,
    write_lock: Mutex<()>,
}

impl EmojiCatalog {
    pub fn new(resources: Arc<dyn ResourceStore>, platform: Arc<dyn Platform>) -> Self {
        Self {
            resources,
            platform,
            write_lock: Mutex::new(()),
        }
    }

    /// On-file names followed by the platform's custom emoji
    pub async fn candidates(&self) -> Result<EmojiNameSet, BotError> {
        let mut names = self.resources.load_emoji_names().await?;
        match self.platform.list_custom_emoji().await {
            Ok(custom) => names.extend(custom),
            Err(e) => tracing::warn!("Could not list custom emoji: {}", e),
        }
        Ok(names)
    }

    /// A uniformly random candidate, if there are any
    pub async fn pick(&self) -> Result<Option<String>, BotError> {
        self.pick_excluding(&HashSet::new()).await
    }

    /// A uniformly random candidate that is not in `skip`
    pub async fn pick_excluding(&self, skip: &HashSet<String>) -> Result<Option<String>, BotError> {
        let names = self.candidates().await?;
        let open: Vec<&String> = names.names().iter().filter(|name| !skip.contains(*name)).collect();
        Ok(open.choose(&mut rand::thread_rng()).map(|name| name.to_string()))
    }

    /// React with `name`, dropping it from the list if the platform does not know it.
    ///
    /// Custom emoji are not on file, so rejecting one removes nothing.
    pub async fn react(&self, name: &str, channel: &str, timestamp: &str) -> Result<Reaction, BotError> {
        let response = self.platform.add_reaction(name, channel, timestamp).await?;
        let removed = match response.failure() {
            Some(ReactionFailure::InvalidName) => self.invalidate(name).await?,
            _ => false,
        };
        Ok(Reaction { response, removed })
    }

    /// Remove `name` from the on-file list. Returns whether it was there.
    pub async fn invalidate(&self, name: &str) -> Result<bool, BotError> {
        let _guard = self.write_lock.lock().await;
        let mut names = self.resources.load_emoji_names().await?;
        if !names.remove(name) {
            return Ok(false);
        }
        self.resources.save_emoji_names(&names).await?;
        tracing::info!("Removed invalid emoji :{}: ({} left)", name, names.len());
        Ok(true)
    }
}

/// Reacts to the message with a random emoji
pub struct EmojiResponder {
    catalog: Arc<EmojiCatalog>,
}

impl EmojiResponder {
    pub fn new(catalog: Arc<EmojiCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Handler for EmojiResponder {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let Some(name) = self.catalog.pick().await? else {
            tracing::debug!("[{}] no emoji to react with", ctx.channel());
            return Ok(Outcome::Skipped);
        };

        let reaction = self
            .catalog
            .react(&name, ctx.channel(), &ctx.message.timestamp)
            .await?;
        match reaction.response.failure() {
            None => {
                tracing::info!("[{}] reacted with :{}:", ctx.channel(), name);
                Ok(Outcome::Responded)
            }
            Some(failure) => {
                tracing::warn!("[{}] reaction :{}: rejected: {:?}", ctx.channel(), name, failure);
                Ok(Outcome::Skipped)
            }
        }
    }
}
