//! crates/valdo_core/src/store.rs
//!
//! The store key set, the JSON round-trip helpers over a raw
//! [`KeyValueStore`], and an in-memory store used by tests and demos.
//!
//! Round-trip contract: JSON-serialize on write, JSON-parse on read, absent
//! key ⇒ documented default. A malformed stored value is indistinguishable
//! from an absent one — it resolves to the default, never to an error.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ports::{KeyValueStore, PortError, PortResult};

/// The string keys of the persistent store.
pub mod keys {
    pub const PROFILE: &str = "profile";
    pub const MEALS: &str = "meals";
    pub const FIRST_TIME_USER: &str = "first_time_user";
    pub const STEPS: &str = "steps";
    pub const STEPS_DATE: &str = "steps_date";
    pub const LAST_WEIGHT_PROMPT_DATE: &str = "last_weight_prompt_date";
}

pub const ALL_KEYS: [&str; 6] = [
    keys::PROFILE,
    keys::MEALS,
    keys::FIRST_TIME_USER,
    keys::STEPS,
    keys::STEPS_DATE,
    keys::LAST_WEIGHT_PROMPT_DATE,
];

/// Reads and JSON-parses one key; absent or malformed ⇒ `None`.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    store
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

/// JSON-serializes and writes one key.
pub fn put_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> PortResult<()> {
    let raw = serde_json::to_string(value)
        .map_err(|err| PortError::Unexpected(format!("failed to encode '{key}': {err}")))?;
    store.set(key, &raw)
}

/// Reads a bare string value (date strings are stored without JSON quoting).
pub fn get_string(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store.get(key).filter(|raw| !raw.is_empty())
}

/// Reads the boolean flag; absent ⇒ `false`.
pub fn get_flag(store: &dyn KeyValueStore, key: &str) -> bool {
    store.get(key).map(|raw| raw == "true").unwrap_or(false)
}

/// Reads a decimal counter; absent or malformed ⇒ 0.
pub fn get_counter(store: &dyn KeyValueStore, key: &str) -> u32 {
    store
        .get(key)
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(0)
}

//=========================================================================================
// In-Memory Store
//=========================================================================================

/// A [`KeyValueStore`] held entirely in memory. Used by unit tests and by
/// the client's ephemeral mode; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;

    #[test]
    fn absent_keys_resolve_to_defaults() {
        let store = MemoryStore::new();
        assert!(get_json::<Profile>(&store, keys::PROFILE).is_none());
        assert!(!get_flag(&store, keys::FIRST_TIME_USER));
        assert_eq!(get_counter(&store, keys::STEPS), 0);
        assert!(get_string(&store, keys::STEPS_DATE).is_none());
    }

    #[test]
    fn malformed_values_resolve_to_defaults() {
        let store = MemoryStore::new();
        store.set(keys::PROFILE, "{not json").unwrap();
        store.set(keys::STEPS, "many").unwrap();
        assert!(get_json::<Profile>(&store, keys::PROFILE).is_none());
        assert_eq!(get_counter(&store, keys::STEPS), 0);
    }

    #[test]
    fn json_values_round_trip() {
        let store = MemoryStore::new();
        let profile = Profile::demo_for_email("sam@example.com");
        put_json(&store, keys::PROFILE, &profile).unwrap();

        let restored: Profile = get_json(&store, keys::PROFILE).expect("profile should load");
        assert_eq!(restored, profile);
    }

    #[test]
    fn flags_use_the_string_encoding() {
        let store = MemoryStore::new();
        store.set(keys::FIRST_TIME_USER, "true").unwrap();
        assert!(get_flag(&store, keys::FIRST_TIME_USER));
        store.set(keys::FIRST_TIME_USER, "false").unwrap();
        assert!(!get_flag(&store, keys::FIRST_TIME_USER));
    }
}
