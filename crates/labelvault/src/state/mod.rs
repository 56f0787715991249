//! Persistent key/value properties and the processed-message tracker built on them.

pub mod tracker;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::db::{property_repo, Database};
use crate::error::StateError;

pub use tracker::ProcessedStateStore;

/// A durable string-to-string property store scoped to this process's user.
pub trait PropertyStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StateError>;
}

/// Property store held in memory; nothing survives the process.
#[derive(Default)]
pub struct MemoryPropertyStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .lock()
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let values = self.values.lock().map_err(|_| StateError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut values = self.values.lock().map_err(|_| StateError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Property store persisted in SQLite.
#[derive(Clone)]
pub struct SqlitePropertyStore {
    db: Database,
}

impl SqlitePropertyStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, StateError> {
        Ok(Self::new(Database::open(path)?))
    }
}

impl PropertyStore for SqlitePropertyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(property_repo::get(&self.db, key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        Ok(property_repo::set(&self.db, key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryPropertyStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = SqlitePropertyStore::open(&path).unwrap();
            store.set("traite:PDF:m1", "1").unwrap();
        }

        let reopened = SqlitePropertyStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("traite:PDF:m1").unwrap().as_deref(),
            Some("1")
        );
    }
}
