//! SQLite persistence for quotes and definitions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{DefinitionRecord, QuoteRecord};
use crate::domain::traits::QuoteStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                quote TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS definitions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                term TEXT NOT NULL,
                definition TEXT NOT NULL,
                defined_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quotes_user ON quotes(user COLLATE NOCASE)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_definitions_term ON definitions(term COLLATE NOCASE)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&conn)?)
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            tracing::warn!("Bad timestamp {:?} in database: {}", raw, e);
            DateTime::<Utc>::default()
        })
}

#[async_trait]
impl QuoteStore for SqliteStore {
    async fn record_quote(&self, user: &str, quote: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO quotes (user, quote, created_at) VALUES (?1, ?2, ?3)",
                params![user, quote, Utc::now().to_rfc3339()],
            )
            .map(|_| ())
        })
    }

    async fn find_quotes(&self, term: &str) -> Result<Vec<QuoteRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user, quote FROM quotes
                 WHERE user = ?1 COLLATE NOCASE OR instr(lower(quote), lower(?1)) > 0
                 ORDER BY id",
            )?;
            let rows = stmt.query_map([term], |row| Ok(QuoteRecord::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
            rows.collect()
        })
    }

    async fn find_all_quotes(&self) -> Result<Vec<QuoteRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT user, quote FROM quotes ORDER BY id")?;
            let rows = stmt.query_map([], |row| Ok(QuoteRecord::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
            rows.collect()
        })
    }

    async fn record_definition(&self, term: &str, definition: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO definitions (term, definition, defined_at) VALUES (?1, ?2, ?3)",
                params![term, definition, Utc::now().to_rfc3339()],
            )
            .map(|_| ())
        })
    }

    async fn find_definitions(&self, term: &str) -> Result<Vec<DefinitionRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT term, definition, defined_at FROM definitions
                 WHERE term = ?1 COLLATE NOCASE
                 ORDER BY id",
            )?;
            let rows = stmt.query_map([term], |row| {
                let defined_at: String = row.get(2)?;
                Ok(DefinitionRecord {
                    term: row.get(0)?,
                    definition: row.get(1)?,
                    defined_at: parse_timestamp(&defined_at),
                })
            })?;
            rows.collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quotes_match_user_or_text_in_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.record_quote("alice", "hello world").await.unwrap();
        store.record_quote("bob", "Alice is late again").await.unwrap();
        store.record_quote("carol", "nothing to see").await.unwrap();

        let found = store.find_quotes("ALICE").await.unwrap();
        assert_eq!(
            found,
            vec![
                QuoteRecord::new("alice", "hello world"),
                QuoteRecord::new("bob", "Alice is late again"),
            ]
        );
        assert!(store.find_quotes("zebra").await.unwrap().is_empty());
        assert_eq!(store.find_all_quotes().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn definitions_accumulate_per_term() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.record_definition("foo", "a furry animal").await.unwrap();
        store.record_definition("Foo", "a placeholder name").await.unwrap();
        store.record_definition("bar", "a place for drinks").await.unwrap();

        let found = store.find_definitions("foo").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].definition, "a furry animal");
        assert_eq!(found[1].definition, "a placeholder name");
        assert!(found[0].defined_at <= found[1].defined_at);
    }

    #[tokio::test]
    async fn like_wildcards_are_literal() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.record_quote("dave", "100% sure").await.unwrap();
        store.record_quote("erin", "pretty sure").await.unwrap();

        let found = store.find_quotes("%").await.unwrap();
        assert_eq!(found, vec![QuoteRecord::new("dave", "100% sure")]);
    }
}
