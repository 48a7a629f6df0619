//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chrono::{DateTime, Utc};
use quip_bot::application::errors::BotError;
use quip_bot::application::messaging::ResponseSender;
use quip_bot::application::services::CommandService;
use quip_bot::domain::entities::{InboundMessage, OutboundMessage, User};
use quip_bot::domain::traits::{BotInfo, Clock, Platform, ReactionResponse, Sleeper};
use quip_bot::infrastructure::database::SqliteStore;
use quip_bot::infrastructure::resources::FileResources;
use tokio::sync::mpsc;

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Platform double that records reactions and rejects configured names
#[derive(Default)]
pub struct MockPlatform {
    pub invalid: Mutex<HashSet<String>>,
    pub custom: Vec<String>,
    /// After this many accepted reactions, answer `too_many_reactions`
    pub reaction_limit: Option<usize>,
    pub reactions: Mutex<Vec<String>>,
    accepted: AtomicUsize,
}

impl MockPlatform {
    pub fn rejecting(names: &[&str]) -> Self {
        Self {
            invalid: Mutex::new(names.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.reaction_limit = Some(limit);
        self
    }

    pub fn with_custom(mut self, names: &[&str]) -> Self {
        self.custom = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn reactions(&self) -> Vec<String> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(&self, _channel: &str, _text: &str) -> Result<(), BotError> {
        Ok(())
    }

    async fn add_reaction(&self, name: &str, _channel: &str, _timestamp: &str) -> Result<ReactionResponse, BotError> {
        self.reactions.lock().unwrap().push(name.to_string());
        if self.invalid.lock().unwrap().contains(name) {
            return Ok(ReactionResponse::error("invalid_name"));
        }
        if let Some(limit) = self.reaction_limit {
            if self.accepted.load(Ordering::SeqCst) >= limit {
                return Ok(ReactionResponse::error("too_many_reactions"));
            }
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);
        Ok(ReactionResponse::ok())
    }

    async fn list_custom_emoji(&self) -> Result<Vec<String>, BotError> {
        Ok(self.custom.clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BotError> {
        Ok(User::new(user_id).with_username(format!("user-{}", user_id.to_lowercase())))
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "B0".into(),
            name: "quip-bot".into(),
        }
    }
}

/// Clock pinned to a settable instant
pub struct FixedClock(pub Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc::now())))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Sleeper that only counts how often it was asked to sleep
#[derive(Default)]
pub struct CountingSleeper {
    pub naps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.naps.lock().unwrap().push(duration);
    }
}

pub struct Harness {
    pub platform: Arc<MockPlatform>,
    pub store: Arc<SqliteStore>,
    pub resources: Arc<FileResources>,
    pub clock: Arc<FixedClock>,
    pub commands: CommandService,
    pub outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(platform: MockPlatform) -> Self {
        ensure_init();
        let dir = tempfile::tempdir().unwrap();
        let platform = Arc::new(platform);
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let resources = Arc::new(FileResources::new(
            dir.path().join("emotes.yaml"),
            dir.path().join("emoji.json"),
        ));
        let clock = FixedClock::new();
        let (sender, outbound) = ResponseSender::channel();
        let commands = CommandService::new(
            platform.clone(),
            store.clone(),
            resources.clone(),
            sender,
            clock.clone(),
        );
        Self {
            platform,
            store,
            resources,
            clock,
            commands,
            outbound,
            dir,
        }
    }

    pub fn emoji_path(&self) -> std::path::PathBuf {
        self.dir.path().join("emoji.json")
    }

    pub fn write_emoji(&self, names: &[&str]) {
        write_json(&self.emoji_path(), names);
    }

    pub fn read_emoji(&self) -> Vec<String> {
        serde_json::from_str(&std::fs::read_to_string(self.emoji_path()).unwrap()).unwrap()
    }

    pub fn write_emotes(&self, yaml: &str) {
        std::fs::write(self.dir.path().join("emotes.yaml"), yaml).unwrap();
    }

    /// Every reply queued so far
    pub fn replies(&mut self) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        while let Ok(message) = self.outbound.try_recv() {
            out.push(message);
        }
        out
    }

    pub fn reply_texts(&mut self) -> Vec<String> {
        self.replies().into_iter().map(|m| m.text).collect()
    }
}

fn write_json(path: &Path, names: &[&str]) {
    std::fs::write(path, serde_json::to_string(names).unwrap()).unwrap();
}

pub fn message(text: &str) -> InboundMessage {
    InboundMessage::new("U1", "C1", text, "1700000000.000100")
}
