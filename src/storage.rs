use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::SaveStoreKind;
use crate::error::Result;

/// String key-value store backing chess save/resume.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether a value was removed.
    fn del(&self, key: &str) -> Result<bool>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn del(&self, key: &str) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}

pub fn open_store(kind: SaveStoreKind) -> Option<Arc<dyn KeyValueStore>> {
    match kind {
        SaveStoreKind::Off => None,
        SaveStoreKind::Memory => Some(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip_and_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("chess-1").unwrap(), None);
        store.set("chess-1", "{}").unwrap();
        assert_eq!(store.get("chess-1").unwrap().as_deref(), Some("{}"));
        assert!(store.del("chess-1").unwrap());
        assert!(!store.del("chess-1").unwrap());
    }

    #[test]
    fn store_is_disabled_unless_configured() {
        assert!(open_store(SaveStoreKind::Off).is_none());
        assert!(open_store(SaveStoreKind::Memory).is_some());
    }
}
