//! localStorage-backed implementation of the shared `KeyValueStore` trait.

use starshop_common::storage::KeyValueStore;

/// Handle over the browser's localStorage.
///
/// Zero-sized: construct one wherever storage access is needed; every handle
/// reads and writes the same browser store. Non-wasm builds fall back to a
/// process-wide in-memory store so the crate type-checks natively.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

impl BrowserStore {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use super::*;

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    impl KeyValueStore for BrowserStore {
        fn get(&self, key: &str) -> Option<String> {
            local_storage()?.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) {
            match local_storage() {
                Some(storage) => {
                    if storage.set_item(key, value).is_err() {
                        tracing::warn!("localStorage write failed for key {key}");
                    }
                }
                None => tracing::warn!("localStorage unavailable, dropping write to {key}"),
            }
        }

        fn remove(&mut self, key: &str) {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(key);
            }
        }

        fn keys(&self) -> Vec<String> {
            let mut out = Vec::new();
            if let Some(storage) = local_storage() {
                let len = storage.length().unwrap_or(0);
                for i in 0..len {
                    if let Ok(Some(key)) = storage.key(i) {
                        out.push(key);
                    }
                }
            }
            out
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native_impl {
    use super::*;
    use starshop_common::storage::MemoryStore;
    use std::sync::{Mutex, OnceLock};

    fn shared() -> &'static Mutex<MemoryStore> {
        static STORE: OnceLock<Mutex<MemoryStore>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(MemoryStore::new()))
    }

    impl KeyValueStore for BrowserStore {
        fn get(&self, key: &str) -> Option<String> {
            shared().lock().ok()?.get(key)
        }

        fn set(&mut self, key: &str, value: &str) {
            if let Ok(mut store) = shared().lock() {
                store.set(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            if let Ok(mut store) = shared().lock() {
                store.remove(key);
            }
        }

        fn keys(&self) -> Vec<String> {
            shared().lock().map(|s| s.keys()).unwrap_or_default()
        }
    }
}
