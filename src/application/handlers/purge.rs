//! Emoji purge - maintenance loop that weeds invalid names out of the list
//!
//! Reacts to one message over and over with random names. Names the platform
//! rejects are dropped from the on-file list; rejected custom emoji are only
//! skipped for the rest of the run. The loop ends when the message cannot
//! take more reactions or no names are left.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::emoji::EmojiCatalog;
use crate::application::errors::BotError;
use crate::application::messaging::ResponseSender;
use crate::domain::traits::{ReactionFailure, Sleeper};

pub const PURGE_RESTART: &str = "Too many reactions on that message! Start the purge again on a fresh one.";

/// Where the purge loop currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeState {
    Probing,
    BackingOff,
    Terminated(PurgeStop),
}

/// Why the purge loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeStop {
    TooManyReactions,
    NoCandidates,
}

/// Summary of one purge run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    pub attempts: usize,
    pub removed: Vec<String>,
    pub stop: PurgeStop,
}

pub struct EmojiPurge {
    catalog: Arc<EmojiCatalog>,
    sender: ResponseSender,
    sleeper: Arc<dyn Sleeper>,
    backoff: Duration,
}

impl EmojiPurge {
    pub fn new(
        catalog: Arc<EmojiCatalog>,
        sender: ResponseSender,
        sleeper: Arc<dyn Sleeper>,
        backoff: Duration,
    ) -> Self {
        Self {
            catalog,
            sender,
            sleeper,
            backoff,
        }
    }

    /// Run until the platform refuses further reactions on the target message
    pub async fn run(&self, channel: &str, timestamp: &str) -> Result<PurgeReport, BotError> {
        tracing::info!("Starting emoji purge on {} @ {}", channel, timestamp);
        let mut report = PurgeReport {
            attempts: 0,
            removed: Vec::new(),
            stop: PurgeStop::NoCandidates,
        };

        // Names that failed this run without coming off the file
        let mut skip = HashSet::new();
        let mut state = PurgeState::Probing;
        loop {
            state = match state {
                PurgeState::Probing => self.probe(channel, timestamp, &mut skip, &mut report).await?,
                PurgeState::BackingOff => {
                    self.sleeper.sleep(self.backoff).await;
                    PurgeState::Probing
                }
                PurgeState::Terminated(stop) => {
                    report.stop = stop;
                    break;
                }
            };
        }

        if report.stop == PurgeStop::TooManyReactions {
            self.sender.send(channel, PURGE_RESTART)?;
        }
        tracing::info!(
            "Emoji purge finished after {} attempts, removed {} names ({:?})",
            report.attempts,
            report.removed.len(),
            report.stop
        );
        Ok(report)
    }

    async fn probe(
        &self,
        channel: &str,
        timestamp: &str,
        skip: &mut HashSet<String>,
        report: &mut PurgeReport,
    ) -> Result<PurgeState, BotError> {
        let Some(name) = self.catalog.pick_excluding(skip).await? else {
            return Ok(PurgeState::Terminated(PurgeStop::NoCandidates));
        };

        report.attempts += 1;
        let reaction = self.catalog.react(&name, channel, timestamp).await?;
        Ok(match reaction.response.failure() {
            None => PurgeState::BackingOff,
            Some(ReactionFailure::InvalidName) => {
                if reaction.removed {
                    report.removed.push(name);
                } else {
                    skip.insert(name);
                }
                PurgeState::BackingOff
            }
            Some(ReactionFailure::TooManyReactions) => PurgeState::Terminated(PurgeStop::TooManyReactions),
            Some(ReactionFailure::Other(code)) => {
                tracing::warn!("Purge reaction :{}: failed: {}", name, code);
                skip.insert(name);
                PurgeState::BackingOff
            }
        })
    }
}
