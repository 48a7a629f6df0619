use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::{BotError, ConfigError};
use crate::application::handlers::{
    AddDefinition, AddQuote, DefineHelp, EmojiCatalog, EmojiPurge, EmojiResponder, EmoteLimits,
    EmoteResponder, FindDefinition, FindQuote, RandomQuote,
};
use crate::application::messaging::{throttled_probabilistic, MessageDispatcher, ResponseSender, Rule};
use crate::domain::traits::{Clock, Platform, QuoteStore, ResourceStore, Sleeper};
use crate::infrastructure::config::{DispatchConfig, EmoteTrigger, FallbackMode};

/// Rule patterns, highest priority first. Each must match the whole text.
pub const QUOTE_ADD_RULE: &str = r"(?s)!quote add(?:\s.*)?";
pub const QUOTE_RANDOM_RULE: &str = r"!quote";
pub const QUOTE_FIND_RULE: &str = r"(?s)!quote\s+.+";
pub const DEFINE_ADD_RULE: &str = r"(?s)!define\s+[^:]+:(?:\s.*)?";
pub const DEFINE_FIND_RULE: &str = r"(?s)!define\s+.+";
pub const DEFINE_HELP_RULE: &str = r"(?s)!define.*";

/// Wires handlers, policies and collaborators into a dispatcher
pub struct CommandService {
    platform: Arc<dyn Platform>,
    store: Arc<dyn QuoteStore>,
    resources: Arc<dyn ResourceStore>,
    sender: ResponseSender,
    clock: Arc<dyn Clock>,
    catalog: Arc<EmojiCatalog>,
}

impl CommandService {
    pub fn new(
        platform: Arc<dyn Platform>,
        store: Arc<dyn QuoteStore>,
        resources: Arc<dyn ResourceStore>,
        sender: ResponseSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let catalog = Arc::new(EmojiCatalog::new(resources.clone(), platform.clone()));
        Self {
            platform,
            store,
            resources,
            sender,
            clock,
            catalog,
        }
    }

    pub fn emoji_catalog(&self) -> Arc<EmojiCatalog> {
        self.catalog.clone()
    }

    /// Quote and definition commands, in priority order
    pub fn register_defaults(&self, dispatcher: MessageDispatcher) -> Result<MessageDispatcher, ConfigError> {
        let store = &self.store;
        let sender = &self.sender;
        Ok(dispatcher
            .with_rule(Rule::new(
                "add-quote",
                QUOTE_ADD_RULE,
                Arc::new(AddQuote::new(store.clone(), sender.clone())),
            )?)
            .with_rule(Rule::new(
                "random-quote",
                QUOTE_RANDOM_RULE,
                Arc::new(RandomQuote::new(store.clone(), sender.clone())),
            )?)
            .with_rule(Rule::new(
                "find-quote",
                QUOTE_FIND_RULE,
                Arc::new(FindQuote::new(store.clone(), sender.clone())),
            )?)
            .with_rule(Rule::new(
                "add-definition",
                DEFINE_ADD_RULE,
                Arc::new(AddDefinition::new(store.clone(), sender.clone())),
            )?)
            .with_rule(Rule::new(
                "find-definition",
                DEFINE_FIND_RULE,
                Arc::new(FindDefinition::new(store.clone(), sender.clone())),
            )?)
            .with_rule(Rule::new(
                "define-help",
                DEFINE_HELP_RULE,
                Arc::new(DefineHelp::new(sender.clone())),
            )?))
    }

    /// One throttled, probabilistic rule per trigger.
    ///
    /// Nothing is read from the emote table here. Phrases, rate limits and
    /// probabilities all come from the file on each matching message.
    pub fn register_emotes(
        &self,
        mut dispatcher: MessageDispatcher,
        triggers: &[EmoteTrigger],
    ) -> Result<MessageDispatcher, BotError> {
        for trigger in triggers {
            let responder = EmoteResponder::new(&trigger.key, self.resources.clone(), self.sender.clone());
            let limits = Arc::new(EmoteLimits::new(&trigger.key, self.resources.clone()));
            let policy = throttled_probabilistic(responder, limits, self.clock.clone());

            let mut rule = Rule::new(format!("emote:{}", trigger.key), &trigger.pattern, Arc::new(policy))?;
            if let Some(user) = &trigger.user {
                rule = rule.for_user(user)?;
            }
            tracing::debug!("Registered emote {} on {}", trigger.key, trigger.pattern);
            dispatcher.push_rule(rule);
        }
        Ok(dispatcher)
    }

    /// The full rule table plus fallback
    pub async fn build_dispatcher(&self, config: &DispatchConfig) -> Result<MessageDispatcher, BotError> {
        let dispatcher = self.register_defaults(MessageDispatcher::new(self.platform.clone()))?;
        let dispatcher = self.register_emotes(dispatcher, &config.triggers)?;

        Ok(match config.fallback {
            FallbackMode::Emoji => dispatcher.with_fallback(Arc::new(EmojiResponder::new(self.catalog.clone()))),
            FallbackMode::None => dispatcher,
        })
    }

    pub fn emoji_purge(&self, sleeper: Arc<dyn Sleeper>, backoff: Duration) -> EmojiPurge {
        EmojiPurge::new(self.catalog.clone(), self.sender.clone(), sleeper, backoff)
    }
}
