//! Small string key-value stores that hold the session between runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{ClientError, Result};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const PENDING_REGISTRATION_KEY: &str = "pendingRegistration";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store; clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> ClientError {
    ClientError::Storage("store lock poisoned".into())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .lock()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.lock().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}

#[cfg(not(target_family = "wasm"))]
pub use file::FileStore;

#[cfg(not(target_family = "wasm"))]
mod file {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use super::KeyValueStore;
    use crate::error::{ClientError, Result};

    /// A JSON object on disk, rewritten on every change.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// `<config dir>/synerharvest/session.json`
        pub fn default_location() -> Option<Self> {
            dirs::config_dir().map(|d| Self::new(d.join("synerharvest").join("session.json")))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load(&self) -> Result<BTreeMap<String, String>> {
            match std::fs::read_to_string(&self.path) {
                Ok(data) => Ok(serde_json::from_str(&data)?),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
                Err(e) => Err(io_err(&self.path, e)),
            }
        }

        fn save(&self, map: &BTreeMap<String, String>) -> Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            let data = serde_json::to_string_pretty(map)?;
            std::fs::write(&self.path, data).map_err(|e| io_err(&self.path, e))
        }
    }

    fn io_err(path: &Path, e: std::io::Error) -> ClientError {
        ClientError::Storage(format!("{}: {e}", path.display()))
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.load()?.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let mut map = self.load()?;
            map.insert(key.to_string(), value.to_string());
            self.save(&map)
        }

        fn remove(&self, key: &str) -> Result<()> {
            let mut map = self.load()?;
            if map.remove(key).is_some() {
                self.save(&map)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &impl KeyValueStore) {
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(USER_KEY, "{}").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap().as_deref(), Some("{}"));
        store.remove("never-set").unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        exercise(&store);
        let clone = store.clone();
        clone.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("session.json"));
        exercise(&store);
        let reopened = FileStore::new(store.path());
        assert_eq!(reopened.get(USER_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::new(path).get(TOKEN_KEY), Err(ClientError::Decode(_))));
    }
}
