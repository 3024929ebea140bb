//! In-process store
//!
//! Same contract as the file store, nothing survives the process.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::Result;
use crate::store::{LocalStore, validate_key};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A panicked writer cannot leave a half-written String behind
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocalStore for MemoryStore {
    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries().get(key).cloned())
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        debug!(%key, len = value.len(), "MemoryStore::write_raw: called");
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.entries().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_and_remove() {
        let store = MemoryStore::new();
        store.write_raw("slot", "1").unwrap();
        store.write_raw("slot", "2").unwrap();
        assert_eq!(store.read_raw("slot").unwrap(), Some("2".to_string()));

        store.remove("slot").unwrap();
        store.remove("slot").unwrap();
        assert_eq!(store.read_raw("slot").unwrap(), None);
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.write_raw("b", "{}").unwrap();
        store.write_raw("a", "{}").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rejects_bad_key() {
        let store = MemoryStore::new();
        assert!(store.write_raw("../x", "{}").is_err());
    }
}
