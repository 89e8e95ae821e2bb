//! Preference persistence — the key-value collaborator, as a trait seam.
//!
//! The SDK never writes the raw password through this seam; only the account
//! label, the access token and the alert settings are persisted.

use std::collections::HashMap;
use std::sync::Mutex;

/// Keys the watcher reads and writes.
pub mod keys {
    pub const ACCOUNT: &str = "account";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const MINIMUM_PRICE: &str = "minimum_price";
    pub const ALERTS_ENABLED: &str = "alerts_enabled";
}

/// A string key-value store that survives process restarts.
///
/// Implementations are expected to be cheap per call; the watcher touches the
/// store only on login, on settings changes and at startup.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store. The default for tests and headless runs; durable
/// backends implement [`PreferenceStore`] on top of whatever they have.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().expect("store mutex poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().expect("store mutex poisoned").remove(key);
    }
}
