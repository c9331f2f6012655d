//! Persisted key/value storage backing the session.
//!
//! DESIGN
//! ======
//! Storage is the durable source of truth shared by the session store and
//! the API client's 401 interceptor. Both sides go through the
//! `KeyValueStore` port and never cache values across calls, so a purge by
//! one is immediately visible to the other.
//!
//! Values are strings, mirroring browser `localStorage`.

pub mod file;

use std::collections::HashMap;
use std::sync::Mutex;

pub use file::FileStore;

/// Key holding the raw bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Key holding the JSON-serialized identity.
pub const USER_DATA_KEY: &str = "userData";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

// =============================================================================
// PORT
// =============================================================================

/// Durable string key/value store.
///
/// Calls are made synchronously while the session lock is held, including
/// from async code, so implementations must be fast and must not block on
/// anything slower than local disk.
pub trait KeyValueStore: Send + Sync {
    /// Read the current value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`, returning the value it held.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// Remove both session keys. Returns `true` if a credential was present.
///
/// # Errors
///
/// Returns the first storage error; the second key is still attempted.
pub fn purge_session(store: &dyn KeyValueStore) -> Result<bool, StorageError> {
    let token = store.remove(AUTH_TOKEN_KEY);
    let user = store.remove(USER_DATA_KEY);
    let had_token = token?.is_some();
    user?;
    Ok(had_token)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Used by tests and for sessions that should not
/// outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.remove(key))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
