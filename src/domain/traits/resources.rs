use async_trait::async_trait;

use crate::application::errors::StorageError;
use crate::domain::entities::{EmojiNameSet, EmoteTable};

/// On-disk resource tables. Implementations must not cache between calls.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn load_emotes(&self) -> Result<EmoteTable, StorageError>;

    async fn load_emoji_names(&self) -> Result<EmojiNameSet, StorageError>;

    async fn save_emoji_names(&self, names: &EmojiNameSet) -> Result<(), StorageError>;
}
