//! Game Store
//!
//! ID-keyed persistence with safe concurrent access. The store knows nothing
//! about what it holds. Every record carries a version so callers can detect
//! that someone else saved between their load and their save.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

/// A stored value together with its write version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// Incremented on every save; the first save of an ID is version 1.
    pub version: u64,
    /// Stored content.
    pub content: T,
}

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The ID is empty.
    #[error("invalid id")]
    InvalidId,

    /// No content is stored under this ID.
    #[error("id {0} does not exist")]
    NotFound(String),

    /// A versioned save found a different version than expected.
    #[error("write conflict on {id}: expected version {expected}, found {actual}")]
    Conflict {
        /// Record identifier.
        id: String,
        /// Version the writer loaded.
        expected: u64,
        /// Version currently stored (0 when absent).
        actual: u64,
    },
}

/// Thread-safe object persistence keyed by client-generated IDs.
pub trait Store<T>: Send + Sync {
    /// Upsert `content` under `id`, returning the new version.
    fn save(&self, id: &str, content: T) -> Result<u64, StoreError>;

    /// Save only if the stored version equals `expected` (0 = must be absent).
    fn save_if_version(&self, id: &str, expected: u64, content: T) -> Result<u64, StoreError>;

    /// Load the content saved under `id`. `Ok(None)` when absent.
    fn load(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError>;

    /// True if content is stored under `id`.
    fn exists(&self, id: &str) -> Result<bool, StoreError>;

    /// Remove the content stored under `id`.
    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Remove everything.
    fn purge_all(&self);

    /// Number of stored records.
    fn len(&self) -> usize;

    /// True when nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() {
        return Err(StoreError::InvalidId);
    }
    Ok(())
}

/// In-memory store guarded by a single reader/writer lock.
///
/// Reads take the shared lock, writes the exclusive one. Each critical
/// section is a single map operation, so a poisoned lock still guards a
/// consistent map and is recovered rather than propagated.
#[derive(Debug)]
pub struct MemoryStore<T> {
    records: RwLock<HashMap<String, Versioned<T>>>,
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Versioned<T>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Versioned<T>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> Store<T> for MemoryStore<T> {
    fn save(&self, id: &str, content: T) -> Result<u64, StoreError> {
        validate_id(id)?;

        let mut records = self.write();
        let version = records.get(id).map_or(0, |r| r.version) + 1;
        records.insert(id.to_string(), Versioned { version, content });
        Ok(version)
    }

    fn save_if_version(&self, id: &str, expected: u64, content: T) -> Result<u64, StoreError> {
        validate_id(id)?;

        let mut records = self.write();
        let actual = records.get(id).map_or(0, |r| r.version);
        if actual != expected {
            return Err(StoreError::Conflict {
                id: id.to_string(),
                expected,
                actual,
            });
        }

        let version = actual + 1;
        records.insert(id.to_string(), Versioned { version, content });
        Ok(version)
    }

    fn load(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError> {
        validate_id(id)?;
        Ok(self.read().get(id).cloned())
    }

    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        validate_id(id)?;
        Ok(self.read().contains_key(id))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;

        match self.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn purge_all(&self) {
        self.write().clear();
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn seeded_store() -> MemoryStore<String> {
        let store = MemoryStore::new();
        store.save("1a2b3c4d5e", "first content".to_string()).unwrap();
        store.save("2a4b6c8d0e", "second content".to_string()).unwrap();
        store
    }

    #[test]
    fn test_save_and_load() {
        let store = seeded_store();
        assert_eq!(store.len(), 2);

        let record = store.load("1a2b3c4d5e").unwrap().unwrap();
        assert_eq!(record.content, "first content");
        assert_eq!(record.version, 1);
    }

    #[test]
    fn test_save_overwrites_and_bumps_version() {
        let store = seeded_store();

        let version = store.save("1a2b3c4d5e", "replaced".to_string()).unwrap();
        assert_eq!(version, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.load("1a2b3c4d5e").unwrap().unwrap().content, "replaced");
    }

    #[test]
    fn test_empty_id_is_invalid() {
        let store = seeded_store();

        assert_eq!(store.save("", "x".to_string()), Err(StoreError::InvalidId));
        assert_eq!(store.load(""), Err(StoreError::InvalidId));
        assert_eq!(store.exists(""), Err(StoreError::InvalidId));
        assert_eq!(store.delete(""), Err(StoreError::InvalidId));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_absent_is_not_an_error() {
        let store = seeded_store();
        assert_eq!(store.load("missing"), Ok(None));
    }

    #[test]
    fn test_exists() {
        let store = MemoryStore::new();
        assert_eq!(store.exists("1a2b3c4d5e"), Ok(false));

        store.save("1a2b3c4d5e", 7u32).unwrap();
        assert_eq!(store.exists("1a2b3c4d5e"), Ok(true));
    }

    #[test]
    fn test_delete() {
        let store = seeded_store();

        store.delete("1a2b3c4d5e").unwrap();
        assert_eq!(store.len(), 1);

        // Second delete of the same ID fails without touching the rest
        let result = store.delete("1a2b3c4d5e");
        assert_eq!(result, Err(StoreError::NotFound("1a2b3c4d5e".to_string())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_purge_all() {
        let store = MemoryStore::<String>::new();
        store.purge_all();

        let store = seeded_store();
        store.purge_all();
        assert!(store.is_empty());

        store.purge_all();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_if_version_create_only() {
        let store = MemoryStore::new();

        assert_eq!(store.save_if_version("game", 0, 1u8), Ok(1));
        let result = store.save_if_version("game", 0, 2u8);
        assert_eq!(
            result,
            Err(StoreError::Conflict {
                id: "game".to_string(),
                expected: 0,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_save_if_version_rejects_stale_writer() {
        let store = MemoryStore::new();
        store.save("game", "v1").unwrap();

        // Two writers load version 1; only the first save wins
        assert_eq!(store.save_if_version("game", 1, "writer a"), Ok(2));
        assert!(matches!(
            store.save_if_version("game", 1, "writer b"),
            Err(StoreError::Conflict { actual: 2, .. })
        ));
        assert_eq!(store.load("game").unwrap().unwrap().content, "writer a");
    }

    #[test]
    fn test_concurrent_saves() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store.save(&format!("{t}-{i}"), i).unwrap();
                        assert!(store.exists(&format!("{t}-{i}")).unwrap());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
