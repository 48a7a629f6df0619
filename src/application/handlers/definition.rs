//! Definition commands: add, find, usage help

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::messaging::context::{Context, Handler, HandlerResult, Outcome};
use crate::application::messaging::parser::{self, DEFINE_FIND};
use crate::application::messaging::ResponseSender;
use crate::domain::traits::QuoteStore;

pub const DEFINE_ADD_USAGE: &str = "Sorry, I couldn't parse that. Try `!define <term>: <definition>`";
pub const DEFINE_HELP: &str =
    "Usage: `!define <term>: <definition>` to teach me, `!define <term> [n]` to look it up";

/// `!define <term>: <definition>`
pub struct AddDefinition {
    store: Arc<dyn QuoteStore>,
    sender: ResponseSender,
}

impl AddDefinition {
    pub fn new(store: Arc<dyn QuoteStore>, sender: ResponseSender) -> Self {
        Self { store, sender }
    }
}

#[async_trait]
impl Handler for AddDefinition {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let Some((term, definition)) = parser::parse_definition_add(ctx.text()) else {
            tracing::error!("[{}] malformed definition from {}: {}", ctx.channel(), ctx.username, ctx.text());
            self.sender.send(ctx.channel(), DEFINE_ADD_USAGE)?;
            return Ok(Outcome::Responded);
        };

        self.store.record_definition(&term, &definition).await?;
        tracing::info!("[{}] {} defined {}", ctx.channel(), ctx.username, term);
        self.sender.send(
            ctx.channel(),
            format!("Okay! `{}` is now defined as, `{}`", term, definition),
        )?;
        Ok(Outcome::Responded)
    }
}

/// `!define <term> [n]`
pub struct FindDefinition {
    store: Arc<dyn QuoteStore>,
    sender: ResponseSender,
}

impl FindDefinition {
    pub fn new(store: Arc<dyn QuoteStore>, sender: ResponseSender) -> Self {
        Self { store, sender }
    }
}

#[async_trait]
impl Handler for FindDefinition {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let Some(term) = parser::capture(&DEFINE_FIND, ctx.text(), "term") else {
            tracing::error!("[{}] no term in: {}", ctx.channel(), ctx.text());
            self.sender.send(ctx.channel(), DEFINE_HELP)?;
            return Ok(Outcome::Responded);
        };

        let definitions = self.store.find_definitions(&term).await?;
        let Some(latest) = definitions.iter().map(|d| d.defined_at).max() else {
            tracing::debug!("[{}] {} is not defined", ctx.channel(), term);
            self.sender.send(ctx.channel(), format!("I don't know what `{}` means yet", term))?;
            return Ok(Outcome::Responded);
        };

        let n = parser::extract_index(ctx.text(), definitions.len(), &DEFINE_FIND, parser::random_index)?;
        let found = &definitions[n - 1];
        self.sender.send(
            ctx.channel(),
            format!(
                "{} ({}/{}): {} (last defined {})",
                found.term,
                n,
                definitions.len(),
                found.definition,
                latest.format("%Y-%m-%d %H:%M UTC")
            ),
        )?;
        Ok(Outcome::Responded)
    }
}

/// Bare or unparseable `!define`
pub struct DefineHelp {
    sender: ResponseSender,
}

impl DefineHelp {
    pub fn new(sender: ResponseSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Handler for DefineHelp {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        self.sender.send(ctx.channel(), DEFINE_HELP)?;
        Ok(Outcome::Responded)
    }
}
