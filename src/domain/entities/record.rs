use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remembered line, attributed to whoever said it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuoteRecord {
    pub user: String,
    pub quote: String,
}

impl QuoteRecord {
    pub fn new(user: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            quote: quote.into(),
        }
    }
}

/// One definition of a term. A term may carry many of these.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefinitionRecord {
    pub term: String,
    pub definition: String,
    pub defined_at: DateTime<Utc>,
}
