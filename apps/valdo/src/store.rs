//! apps/valdo/src/store.rs
//!
//! The file-backed persistent store: one JSON file holding the whole
//! string-keyed map, read once at startup and rewritten synchronously on
//! every mutation. This is the durable counterpart of the in-memory store
//! the core's tests use.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use valdo_core::ports::{KeyValueStore, PortError, PortResult};

pub struct FileStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    /// A missing or unreadable file starts the map empty; corruption is not
    /// an error, it is an empty store.
    pub fn new(path: PathBuf) -> PortResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                PortError::Unexpected(format!(
                    "failed to create store directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let data = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => BTreeMap::new(),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> PortResult<()> {
        let serialized = serde_json::to_string_pretty(data)
            .map_err(|err| PortError::Unexpected(format!("failed to encode store: {err}")))?;
        fs::write(&self.path, serialized).map_err(|err| {
            PortError::Unexpected(format!(
                "failed to write store to {}: {err}",
                self.path.display()
            ))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut guard = self.data.write().expect("store lock poisoned");
        guard.insert(key.to_string(), value.to_string());
        self.persist(&guard)
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let mut guard = self.data.write().expect("store lock poisoned");
        guard.remove(key);
        self.persist(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("valdo-store-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn values_survive_a_reopen() {
        let path = temp_store_path("reopen");
        let _ = fs::remove_file(&path);

        {
            let store = FileStore::new(path.clone()).unwrap();
            store.set("profile", r#"{"name":"Sam"}"#).unwrap();
            store.set("steps", "1200").unwrap();
        }

        let reopened = FileStore::new(path.clone()).unwrap();
        assert_eq!(reopened.get("steps").as_deref(), Some("1200"));
        assert_eq!(reopened.get("profile").as_deref(), Some(r#"{"name":"Sam"}"#));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn remove_deletes_the_key_durably() {
        let path = temp_store_path("remove");
        let _ = fs::remove_file(&path);

        let store = FileStore::new(path.clone()).unwrap();
        store.set("meals", "[]").unwrap();
        store.remove("meals").unwrap();
        assert!(store.get("meals").is_none());

        let reopened = FileStore::new(path.clone()).unwrap();
        assert!(reopened.get("meals").is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "definitely not json").unwrap();

        let store = FileStore::new(path.clone()).unwrap();
        assert!(store.get("profile").is_none());

        let _ = fs::remove_file(&path);
    }
}
