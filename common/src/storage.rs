use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Abstract string key-value store backing all persistent state.
///
/// The browser build implements this over `window.localStorage`; native
/// builds and tests use [`MemoryStore`]. There is no atomicity across keys
/// and no mutual exclusion between writers. A concurrent writer (another
/// browser tab) can overwrite a key between a read and the following write;
/// last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored value exists but does not decode as its expected schema.
    #[error("corrupt state under key `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode a JSON value. `Ok(None)` when the key is absent.
pub fn get_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

/// Read and decode a JSON value, falling back to `T::default()` when absent.
pub fn get_json_or_default<T, S>(store: &S, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    Ok(get_json(store, key)?.unwrap_or_default())
}

/// Encode a value as JSON and write it under `key`.
pub fn set_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw);
    Ok(())
}

/// In-memory key-value store for tests and non-browser builds.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
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

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_none() {
        let store = MemoryStore::new();
        let got: Option<Vec<u32>> = get_json(&store, "missing").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn round_trip_through_json() {
        let mut store = MemoryStore::new();
        set_json(&mut store, "numbers", &vec![1u32, 2, 3]).unwrap();
        let got: Option<Vec<u32>> = get_json(&store, "numbers").unwrap();
        assert_eq!(got, Some(vec![1, 2, 3]));
    }

    #[test]
    fn malformed_json_is_a_corrupt_error_not_a_panic() {
        let mut store = MemoryStore::new();
        store.set("broken", "{not json");
        let got: Result<Option<Vec<u32>>, _> = get_json(&store, "broken");
        match got {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, "broken"),
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }

    #[test]
    fn keys_lists_everything_written() {
        let mut store = MemoryStore::new();
        store.set("a", "1");
        store.set("b", "2");
        store.remove("a");
        assert_eq!(store.keys(), vec!["b".to_string()]);
    }
}
