//! Persistence boundary.
//!
//! The stores never touch browser storage directly: they go through a
//! [`RosterStorage`] handed to them, whose only operations are `load` and
//! `save` of a raw string under a fixed key. In the Web Worker the backing
//! implementation is [`MemoryStorage`]; the page's JS bridge mirrors it to
//! `localStorage` via `/api/state` and restores it on load.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::roster::config::{CURRENT_PAGE_KEY, PAGES_KEY, PLAYERS_KEY};
use crate::roster::error::{Result, RosterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    Players,
    Pages,
    CurrentPage,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::Players,
        StorageKey::Pages,
        StorageKey::CurrentPage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Players => PLAYERS_KEY,
            StorageKey::Pages => PAGES_KEY,
            StorageKey::CurrentPage => CURRENT_PAGE_KEY,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

pub trait RosterStorage {
    type Error: std::error::Error + 'static;

    /// Raw stored value, `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: StorageKey) -> std::result::Result<Option<String>, Self::Error>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn save(&self, key: StorageKey, value: &str) -> std::result::Result<(), Self::Error>;
}

/// In-memory key/value store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<StorageKey, String>>>,
}

impl RosterStorage for MemoryStorage {
    type Error = Infallible;

    fn load(&self, key: StorageKey) -> std::result::Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(&key).cloned())
    }

    fn save(&self, key: StorageKey, value: &str) -> std::result::Result<(), Self::Error> {
        self.entries.borrow_mut().insert(key, value.to_string());
        Ok(())
    }
}

/// Every persisted key with its raw string, exactly as `localStorage` holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState(pub BTreeMap<String, String>);

impl MemoryStorage {
    pub fn export(&self) -> PersistedState {
        PersistedState(
            self.entries
                .borrow()
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect(),
        )
    }

    /// Replace all entries; unknown keys are ignored.
    pub fn restore(&self, state: &PersistedState) {
        let mut entries = self.entries.borrow_mut();
        entries.clear();
        for (name, value) in &state.0 {
            match StorageKey::from_name(name) {
                Some(key) => {
                    entries.insert(key, value.clone());
                }
                None => log::debug!("ignoring unknown storage key {name}"),
            }
        }
    }
}

// ── JSON helpers used by the stores ────────────────────────────────

pub(crate) fn load_raw<S: RosterStorage>(storage: &S, key: StorageKey) -> Result<Option<String>> {
    storage
        .load(key)
        .map_err(|e| RosterError::Storage(e.to_string()))
}

/// Load a JSON array. Missing, corrupt or non-array values read as empty.
pub(crate) fn load_json_array<S: RosterStorage>(storage: &S, key: StorageKey) -> Result<Vec<Value>> {
    let Some(raw) = load_raw(storage, key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(_) => {
            log::warn!("{} is not a JSON array; treating as empty", key.as_str());
            Ok(Vec::new())
        }
        Err(e) => {
            log::warn!("{} holds corrupt JSON ({e}); treating as empty", key.as_str());
            Ok(Vec::new())
        }
    }
}

pub(crate) fn save_json<S: RosterStorage, T: Serialize + ?Sized>(
    storage: &S,
    key: StorageKey,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    storage
        .save(key, &json)
        .map_err(|e| RosterError::Storage(e.to_string()))
}

pub(crate) fn save_raw<S: RosterStorage>(storage: &S, key: StorageKey, value: &str) -> Result<()> {
    storage
        .save(key, value)
        .map_err(|e| RosterError::Storage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_empty() {
        let storage = MemoryStorage::default();
        assert!(load_json_array(&storage, StorageKey::Players).unwrap().is_empty());
    }

    #[test]
    fn corrupt_json_loads_empty() {
        let storage = MemoryStorage::default();
        storage.save(StorageKey::Pages, "not valid json {{{").unwrap();
        assert!(load_json_array(&storage, StorageKey::Pages).unwrap().is_empty());
        storage.save(StorageKey::Pages, r#"{"id": 1}"#).unwrap();
        assert!(load_json_array(&storage, StorageKey::Pages).unwrap().is_empty());
    }

    #[test]
    fn save_then_load_array() {
        let storage = MemoryStorage::default();
        save_json(&storage, StorageKey::Pages, &vec![1, 2, 3]).unwrap();
        let items = load_json_array(&storage, StorageKey::Pages).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn clones_share_entries() {
        let a = MemoryStorage::default();
        let b = a.clone();
        a.save(StorageKey::CurrentPage, "5").unwrap();
        assert_eq!(b.load(StorageKey::CurrentPage).unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn export_uses_local_storage_key_names() {
        let storage = MemoryStorage::default();
        storage.save(StorageKey::CurrentPage, "5").unwrap();
        storage.save(StorageKey::Players, "[]").unwrap();
        let state = storage.export();
        assert_eq!(state.0.get("current_page_v2").map(String::as_str), Some("5"));
        assert_eq!(state.0.get("players_v2").map(String::as_str), Some("[]"));
    }

    #[test]
    fn restore_replaces_entries_and_skips_unknown_keys() {
        let storage = MemoryStorage::default();
        storage.save(StorageKey::Pages, "[]").unwrap();
        let mut map = BTreeMap::new();
        map.insert("players_v2".to_string(), "[{}]".to_string());
        map.insert("theme".to_string(), "dark".to_string());
        storage.restore(&PersistedState(map));
        assert_eq!(storage.load(StorageKey::Pages).unwrap(), None);
        assert_eq!(storage.load(StorageKey::Players).unwrap().as_deref(), Some("[{}]"));
        assert_eq!(storage.export().0.len(), 1);
    }
}
