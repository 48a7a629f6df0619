//! Message dispatcher - Routes each message to at most one handler

use regex_lite::Regex;
use std::sync::Arc;

use super::context::{Context, Handler, Outcome};
use super::parser::full_match;
use crate::application::errors::{BotError, ConfigError};
use crate::domain::entities::InboundMessage;
use crate::domain::traits::Platform;

/// One entry of the ordered rule table
pub struct Rule {
    name: String,
    text: Regex,
    user: Option<Regex>,
    /// `None` makes this a terminal rule that swallows the message
    handler: Option<Arc<dyn Handler>>,
}

impl Rule {
    /// Route messages whose whole text matches `pattern`
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.into(),
            text: compile(pattern)?,
            user: None,
            handler: Some(handler),
        })
    }

    /// Match and stop: nothing runs, the fallback does not either
    pub fn terminal(name: impl Into<String>, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.into(),
            text: compile(pattern)?,
            user: None,
            handler: None,
        })
    }

    /// Additionally require the resolved username to match `pattern`
    pub fn for_user(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.user = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, username: &str, text: &str) -> bool {
        self.user.as_ref().map_or(true, |u| u.is_match(username)) && self.text.is_match(text)
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    full_match(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// What happened to a dispatched message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Rule { name: String, outcome: Outcome },
    Terminal { name: String },
    Fallback(Outcome),
    NoMatch,
}

/// Message dispatcher - first matching rule wins, list order is priority
pub struct MessageDispatcher {
    platform: Arc<dyn Platform>,
    rules: Vec<Rule>,
    fallback: Option<Arc<dyn Handler>>,
}

impl MessageDispatcher {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            rules: Vec::new(),
            fallback: None,
        }
    }

    /// Append a rule after every rule registered so far
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Handler for messages no rule matched
    pub fn with_fallback(mut self, handler: Arc<dyn Handler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::name)
    }

    /// Name of the first rule matching, if any
    pub fn route(&self, username: &str, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(username, text))
    }

    async fn resolve_username(&self, sender: &str) -> String {
        match self.platform.get_user(sender).await {
            Ok(user) => user.display_name(),
            Err(e) => {
                tracing::warn!("Could not resolve user {}: {}", sender, e);
                sender.to_string()
            }
        }
    }

    /// Route one message. Errors belong to this message alone.
    pub async fn dispatch(&self, message: InboundMessage) -> Result<Dispatch, BotError> {
        let username = self.resolve_username(&message.sender).await;
        let ctx = Context::new(message, username);

        let Some(rule) = self.route(&ctx.username, ctx.text()) else {
            return match &self.fallback {
                Some(handler) => Ok(Dispatch::Fallback(handler.handle(&ctx).await?)),
                None => {
                    tracing::debug!("[{}] no action found for: {}", ctx.channel(), ctx.text());
                    Ok(Dispatch::NoMatch)
                }
            };
        };

        let Some(handler) = &rule.handler else {
            tracing::debug!("[{}] {} matched, no action", ctx.channel(), rule.name);
            return Ok(Dispatch::Terminal {
                name: rule.name.clone(),
            });
        };

        tracing::debug!("[{}] {} -> {}", ctx.channel(), ctx.username, rule.name);
        match handler.handle(&ctx).await {
            Ok(outcome) => Ok(Dispatch::Rule {
                name: rule.name.clone(),
                outcome,
            }),
            Err(e) => {
                tracing::error!("[{}] {} failed: {}", ctx.channel(), rule.name, e);
                Err(e)
            }
        }
    }
}
