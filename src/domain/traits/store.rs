use async_trait::async_trait;

use crate::application::errors::StorageError;
use crate::domain::entities::{DefinitionRecord, QuoteRecord};

/// Store trait - persistence for quotes and definitions
#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn record_quote(&self, user: &str, quote: &str) -> Result<(), StorageError>;

    /// Quotes by a user or containing the term, oldest first
    async fn find_quotes(&self, term: &str) -> Result<Vec<QuoteRecord>, StorageError>;

    async fn find_all_quotes(&self) -> Result<Vec<QuoteRecord>, StorageError>;

    async fn record_definition(&self, term: &str, definition: &str) -> Result<(), StorageError>;

    /// Every definition of a term, oldest first
    async fn find_definitions(&self, term: &str) -> Result<Vec<DefinitionRecord>, StorageError>;
}
