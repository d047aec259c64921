//! Browser LocalStorage backend

use web_sys::Storage;

use super::{KeyValueStore, PersistenceError};

pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Open the window's LocalStorage
    pub fn open() -> Result<Self, PersistenceError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistenceError::Unavailable)?;
        Ok(Self { storage })
    }
}

fn backend_error(e: wasm_bindgen::JsValue) -> PersistenceError {
    PersistenceError::Backend(format!("{e:?}"))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage.get_item(key).map_err(backend_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage.set_item(key, value).map_err(backend_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage.remove_item(key).map_err(backend_error)
    }
}
