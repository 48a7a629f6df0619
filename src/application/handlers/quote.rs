//! Quote commands: add, find by user or term, random

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;

use crate::application::messaging::context::{Context, Handler, HandlerResult, Outcome};
use crate::application::messaging::parser::{self, QUOTE_FIND};
use crate::application::messaging::ResponseSender;
use crate::domain::traits::QuoteStore;

pub const QUOTE_ADD_USAGE: &str = "Sorry, I couldn't parse that. Try `!quote add <user>: <quote>`";
pub const QUOTE_DB_EMPTY: &str = "Quote DB is empty! Quote some things and try again";

/// `!quote add <user>: <quote>`
pub struct AddQuote {
    store: Arc<dyn QuoteStore>,
    sender: ResponseSender,
}

impl AddQuote {
    pub fn new(store: Arc<dyn QuoteStore>, sender: ResponseSender) -> Self {
        Self { store, sender }
    }
}

#[async_trait]
impl Handler for AddQuote {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let Some((user, quote)) = parser::parse_quote_add(ctx.text()) else {
            tracing::error!("[{}] malformed quote from {}: {}", ctx.channel(), ctx.username, ctx.text());
            self.sender.send(ctx.channel(), QUOTE_ADD_USAGE)?;
            return Ok(Outcome::Responded);
        };

        self.store.record_quote(&user, &quote).await?;
        tracing::info!("[{}] {} quoted {}", ctx.channel(), ctx.username, user);
        self.sender.send(ctx.channel(), format!("Quoted {}: \"{}\"", user, quote))?;
        Ok(Outcome::Responded)
    }
}

/// `!quote <term> [n]`, matching on user or quote text
pub struct FindQuote {
    store: Arc<dyn QuoteStore>,
    sender: ResponseSender,
}

impl FindQuote {
    pub fn new(store: Arc<dyn QuoteStore>, sender: ResponseSender) -> Self {
        Self { store, sender }
    }
}

#[async_trait]
impl Handler for FindQuote {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let Some(term) = parser::capture(&QUOTE_FIND, ctx.text(), "term") else {
            tracing::error!("[{}] no search term in: {}", ctx.channel(), ctx.text());
            return Ok(Outcome::Skipped);
        };

        let quotes = self.store.find_quotes(&term).await?;
        if quotes.is_empty() {
            tracing::debug!("[{}] no quotes for {}", ctx.channel(), term);
            return Ok(Outcome::Skipped);
        }

        let n = parser::extract_index(ctx.text(), quotes.len(), &QUOTE_FIND, parser::random_index)?;
        let found = &quotes[n - 1];
        self.sender.send(
            ctx.channel(),
            format!("{}: {} ({}/{})", found.user, found.quote, n, quotes.len()),
        )?;
        Ok(Outcome::Responded)
    }
}

/// Bare `!quote`
pub struct RandomQuote {
    store: Arc<dyn QuoteStore>,
    sender: ResponseSender,
}

impl RandomQuote {
    pub fn new(store: Arc<dyn QuoteStore>, sender: ResponseSender) -> Self {
        Self { store, sender }
    }
}

#[async_trait]
impl Handler for RandomQuote {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        let quotes = self.store.find_all_quotes().await?;
        let picked = quotes.choose(&mut rand::thread_rng()).cloned();

        let reply = match picked {
            Some(q) => format!("{}: {}", q.user, q.quote),
            None => QUOTE_DB_EMPTY.to_string(),
        };
        self.sender.send(ctx.channel(), reply)?;
        Ok(Outcome::Responded)
    }
}
