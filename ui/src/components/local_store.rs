//! Browser `localStorage` behind the client's [`KeyValueStore`] seam.
//!
//! Outside the browser (desktop/mobile builds) the session lives in memory.

use harvest_client::storage::KeyValueStore;
use harvest_client::Result;

#[cfg(target_family = "wasm")]
#[derive(Debug, Clone, Default)]
pub struct LocalStore;

#[cfg(target_family = "wasm")]
impl LocalStore {
    fn storage() -> Result<web_sys::Storage> {
        use harvest_client::ClientError;

        web_sys::window()
            .ok_or_else(|| ClientError::Storage("No window".into()))?
            .local_storage()
            .map_err(|_| ClientError::Storage("No localStorage".into()))?
            .ok_or_else(|| ClientError::Storage("localStorage unavailable".into()))
    }
}

#[cfg(target_family = "wasm")]
fn js_err(e: wasm_bindgen::JsValue) -> harvest_client::ClientError {
    harvest_client::ClientError::Storage(format!("{e:?}"))
}

#[cfg(target_family = "wasm")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?.get_item(key).map_err(js_err)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?.set_item(key, value).map_err(js_err)
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::storage()?.remove_item(key).map_err(js_err)
    }
}

#[cfg(not(target_family = "wasm"))]
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    inner: harvest_client::storage::MemoryStore,
}

#[cfg(not(target_family = "wasm"))]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}
