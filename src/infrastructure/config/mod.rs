//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub resources: ResourcesConfig,
    pub dispatch: DispatchConfig,
    pub purge: PurgeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// SQLite file holding quotes and definitions
    pub database: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourcesConfig {
    /// YAML emote table
    pub emotes: PathBuf,
    /// JSON array of emoji names
    pub emoji: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatchConfig {
    #[serde(default)]
    pub fallback: FallbackMode,
    /// Emote rules, checked after the built-in commands in this order
    #[serde(default)]
    pub triggers: Vec<EmoteTrigger>,
}

/// What to do with a message no rule matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
    /// React with a random emoji
    #[default]
    Emoji,
    /// Log and do nothing
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmoteTrigger {
    /// Category in the emote table
    pub key: String,
    /// Full-match pattern on the message text
    pub pattern: String,
    /// Optional full-match pattern on the sender's display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PurgeConfig {
    /// Pause between two purge reactions
    pub backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "quip-bot".to_string(),
            },
            storage: StorageConfig {
                database: PathBuf::from("quip-bot.db"),
            },
            resources: ResourcesConfig {
                emotes: PathBuf::from("resources/emotes.yaml"),
                emoji: PathBuf::from("resources/emoji.json"),
            },
            dispatch: DispatchConfig {
                fallback: FallbackMode::Emoji,
                triggers: vec![
                    EmoteTrigger {
                        key: "shrug".to_string(),
                        pattern: r"(?i).*\bshrugs?\b.*".to_string(),
                        user: None,
                    },
                    EmoteTrigger {
                        key: "tableflip".to_string(),
                        pattern: r"(?i).*\bflips? (a |the )?table\b.*".to_string(),
                        user: None,
                    },
                    EmoteTrigger {
                        key: "greeting".to_string(),
                        pattern: r"(?i)(hi|hello|hey|morning),? (bot|quip-bot)!*".to_string(),
                        user: None,
                    },
                ],
            },
            purge: PurgeConfig { backoff_ms: 1500 },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| ConfigError::InvalidValue(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Defaults with environment overrides applied
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(name) = std::env::var("BOT_NAME") {
            self.bot.name = name;
        }

        if let Ok(database) = std::env::var("BOT_DATABASE") {
            self.storage.database = PathBuf::from(database);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        Config::default().save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.dispatch.triggers, Config::default().dispatch.triggers);
        assert_eq!(loaded.dispatch.fallback, FallbackMode::Emoji);
        assert_eq!(loaded.purge.backoff_ms, 1500);
    }

    #[test]
    fn parses_kebab_case_keys() {
        let yaml = r#"
bot:
  name: test-bot
storage:
  database: /tmp/test.db
resources:
  emotes: emotes.yaml
  emoji: emoji.json
dispatch:
  fallback: none
  triggers:
    - key: shrug
      pattern: ".*shrug.*"
      user: alice
purge:
  backoff-ms: 10
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.dispatch.fallback, FallbackMode::None);
        assert_eq!(config.dispatch.triggers[0].user.as_deref(), Some("alice"));
        assert_eq!(config.purge.backoff_ms, 10);
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
