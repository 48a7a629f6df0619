use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Emote phrase table, keyed by category.
///
/// Read from disk on every use; nothing holds on to a copy between calls.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmoteTable {
    #[serde(default)]
    pub phrases: HashMap<String, Vec<String>>,
    /// Minimum seconds between two responses of a category
    #[serde(default)]
    pub rate_limits: HashMap<String, u64>,
    /// Percent chance (0-99) that a category responds at all
    #[serde(default)]
    pub probabilities: HashMap<String, u32>,
}

impl EmoteTable {
    pub fn phrases(&self, key: &str) -> &[String] {
        self.phrases.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rate_limit(&self, key: &str) -> u64 {
        self.rate_limits.get(key).copied().unwrap_or(0)
    }

    /// Missing entries always fire
    pub fn probability(&self, key: &str) -> u32 {
        self.probabilities.get(key).copied().unwrap_or(100)
    }
}

/// Ordered, de-duplicated list of emoji names the bot may react with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmojiNameSet {
    names: Vec<String>,
}

impl EmojiNameSet {
    pub fn new(names: Vec<String>) -> Self {
        let mut set = Self::default();
        set.extend(names);
        set
    }

    pub fn extend(&mut self, names: impl IntoIterator<Item = String>) {
        for name in names {
            if !self.names.contains(&name) {
                self.names.push(name);
            }
        }
    }

    /// Returns true if the name was present
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emote_table_defaults() {
        let table = EmoteTable::default();
        assert!(table.phrases("shrug").is_empty());
        assert_eq!(table.rate_limit("shrug"), 0);
        assert_eq!(table.probability("shrug"), 100);
    }

    #[test]
    fn emote_table_parses_kebab_case_yaml() {
        let yaml = "phrases:\n  shrug: ['¯\\_(ツ)_/¯']\nrate-limits:\n  shrug: 30\nprobabilities:\n  shrug: 50\n";
        let table: EmoteTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.phrases("shrug").len(), 1);
        assert_eq!(table.rate_limit("shrug"), 30);
        assert_eq!(table.probability("shrug"), 50);
    }

    #[test]
    fn emoji_set_dedupes_and_removes() {
        let mut set = EmojiNameSet::new(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(set.names(), ["a", "b"]);
        set.extend(vec!["c".to_string(), "b".to_string()]);
        assert_eq!(set.len(), 3);
        assert!(set.remove("b"));
        assert!(!set.remove("b"));
        assert!(!set.contains("b"));
    }
}
