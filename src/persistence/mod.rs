//! Key-value persistence
//!
//! Profile, settings and the local score table are stored as JSON strings
//! under fixed keys. The browser build writes to LocalStorage; tests and the
//! native binary use [`MemoryStore`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage unavailable")]
    Unavailable,
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Corrupt value for `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store for tests and native runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read and decode a JSON value; `Ok(None)` when the key is absent
pub fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistenceError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistenceError::Corrupt {
            key: key.to_string(),
            source,
        })
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Load a value, falling back to `T::default()` on absence or failure
pub fn load_or_default<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> T {
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Using default for `{key}`: {e}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "credits", &2500u64).expect("save");
        assert_eq!(store.get("credits").expect("get").as_deref(), Some("2500"));
        assert_eq!(load_json::<u64>(&store, "credits").expect("load"), Some(2500));

        store.remove("credits").expect("remove");
        assert!(store.is_empty());
        assert_eq!(load_json::<u64>(&store, "credits").expect("load"), None);
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let mut store = MemoryStore::new();
        store.set("credits", "lots").expect("set");
        let err = load_json::<u64>(&store, "credits").expect_err("corrupt");
        assert!(matches!(err, PersistenceError::Corrupt { ref key, .. } if key == "credits"));
        assert!(err.to_string().contains("credits"));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let mut store = MemoryStore::new();
        store.set("unlocked_themes", "{not json").expect("set");
        let themes: Vec<String> = load_or_default(&store, "unlocked_themes");
        assert!(themes.is_empty());
        let missing: u64 = load_or_default(&store, "credits");
        assert_eq!(missing, 0);
    }
}
