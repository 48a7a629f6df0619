//! Handler context and the handler trait every command implements

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::InboundMessage;

/// What a handler gets to see about one dispatched message
#[derive(Debug, Clone)]
pub struct Context {
    pub message: InboundMessage,
    /// Display name resolved once per dispatch
    pub username: String,
}

impl Context {
    pub fn new(message: InboundMessage, username: impl Into<String>) -> Self {
        Self {
            message,
            username: username.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.message.channel
    }

    pub fn text(&self) -> &str {
        self.message.trimmed_text()
    }
}

/// Whether a handler actually produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Responded,
    Skipped,
}

/// Handler result
pub type HandlerResult = Result<Outcome, BotError>;

/// A command behavior the dispatcher can route to
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context) -> HandlerResult;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        (**self).handle(ctx).await
    }
}
