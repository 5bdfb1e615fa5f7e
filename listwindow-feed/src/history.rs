//! Recent-search history over an injectable key-value store.

use std::collections::HashMap;

use crate::StoreError;

/// Storage key the history is kept under.
pub const HISTORY_KEY: &str = "keywordsHistory";

/// Default number of searches remembered.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// A string key-value store (browser local storage, a file, a test map).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// An in-memory [`KeyValueStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Most-recent-first list of distinct search terms, persisted as a JSON array.
#[derive(Clone, Debug)]
pub struct SearchHistory<S: KeyValueStore> {
    store: S,
    entries: Vec<String>,
    limit: usize,
}

impl<S: KeyValueStore> SearchHistory<S> {
    /// Loads the history from `store`. A missing or unreadable entry yields an empty history.
    pub fn load(store: S) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|_err| {
                vwarn!(error = %_err, "ignoring unreadable search history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self {
            store,
            entries,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Caps the history at `limit` entries (at least one). Takes effect on the next record.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Records a search and persists the history.
    ///
    /// The term is trimmed; blank terms are ignored and return `Ok(false)`. A repeated term moves
    /// to the front instead of appearing twice.
    pub fn record(&mut self, term: &str) -> Result<bool, StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(false);
        }

        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(term.to_owned());
        next.extend(self.entries.iter().filter(|e| e.as_str() != term).cloned());
        next.truncate(self.limit);

        let raw = serde_json::to_string(&next)?;
        self.store.set(HISTORY_KEY, raw)?;
        self.entries = next;
        vtrace!(term, len = self.entries.len(), "search recorded");
        Ok(true)
    }
}
