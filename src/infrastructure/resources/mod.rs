//! File-backed resource tables

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::application::errors::StorageError;
use crate::domain::entities::{EmojiNameSet, EmoteTable};
use crate::domain::traits::ResourceStore;

/// Emote table (YAML) and emoji list (JSON), read from disk on every call
pub struct FileResources {
    emotes_path: PathBuf,
    emoji_path: PathBuf,
}

impl FileResources {
    pub fn new(emotes_path: impl Into<PathBuf>, emoji_path: impl Into<PathBuf>) -> Self {
        Self {
            emotes_path: emotes_path.into(),
            emoji_path: emoji_path.into(),
        }
    }

    /// A missing file reads as empty
    async fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("{} not found, treating as empty", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ResourceStore for FileResources {
    async fn load_emotes(&self) -> Result<EmoteTable, StorageError> {
        let Some(content) = Self::read_optional(&self.emotes_path).await? else {
            return Ok(EmoteTable::default());
        };
        serde_yaml::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("{}: {}", self.emotes_path.display(), e))
        })
    }

    async fn load_emoji_names(&self) -> Result<EmojiNameSet, StorageError> {
        let Some(content) = Self::read_optional(&self.emoji_path).await? else {
            return Ok(EmojiNameSet::default());
        };
        let names: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("{}: {}", self.emoji_path.display(), e))
        })?;
        Ok(EmojiNameSet::new(names))
    }

    async fn save_emoji_names(&self, names: &EmojiNameSet) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(names.names())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Some(parent) = self.emoji_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.emoji_path, content).await?;
        Ok(())
    }
}
