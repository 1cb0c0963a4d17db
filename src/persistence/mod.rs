//! Save/load of the progression ledger
//!
//! Storage is a plain key/value string store: LocalStorage in the browser,
//! an in-memory map on native and in tests. A missing or unreadable save is
//! never fatal; the ledger starts fresh.

use std::collections::HashMap;

use crate::progression::ProgressionLedger;

/// Key the ledger is saved under
pub const SAVE_KEY: &str = "glizzy_run_save";

/// Minimal key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns false if the write failed (quota, private mode, ...)
    fn set(&mut self, key: &str, value: &str) -> bool;
    fn remove(&mut self, key: &str);
}

/// Volatile storage for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        Self::storage()
            .map(|s| s.set_item(key, value).is_ok())
            .unwrap_or(false)
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Load the ledger, falling back to a fresh one
pub fn load_ledger<S: Storage + ?Sized>(storage: &S) -> ProgressionLedger {
    let Some(json) = storage.get(SAVE_KEY) else {
        log::info!("No save data found, starting fresh");
        return ProgressionLedger::default();
    };
    match ProgressionLedger::from_json(&json) {
        Ok(ledger) => {
            log::info!(
                "Loaded save: level {}, {} games played",
                ledger.player_level,
                ledger.games_played
            );
            ledger
        }
        Err(e) => {
            log::warn!("Save data unreadable ({}), starting fresh", e);
            ProgressionLedger::default()
        }
    }
}

/// Write the ledger; returns false if it could not be stored
pub fn save_ledger<S: Storage + ?Sized>(storage: &mut S, ledger: &ProgressionLedger) -> bool {
    match ledger.to_json() {
        Ok(json) => {
            let ok = storage.set(SAVE_KEY, &json);
            if !ok {
                log::warn!("Failed to write save data");
            }
            ok
        }
        Err(e) => {
            log::warn!("Failed to serialize save data: {}", e);
            false
        }
    }
}

/// Delete the save
pub fn clear_ledger<S: Storage + ?Sized>(storage: &mut S) {
    storage.remove(SAVE_KEY);
    log::info!("Save data cleared");
}
