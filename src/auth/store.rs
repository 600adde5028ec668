//! Persisted session storage.
//!
//! The client persists exactly four string values between launches:
//! the bearer token, the user id, the role, and the verified phone
//! number. This module defines the `SessionStore` contract over those
//! keys and three backends:
//!
//! - `KeyringStore`: OS keychain via the keyring crate (default)
//! - `JsonFileStore`: JSON file under the platform data directory
//! - `MemoryStore`: in-process map with failure injection, for tests

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Storage key for the bearer token. Its presence defines "logged in".
pub const KEY_TOKEN: &str = "token";
/// Storage key for the account id, stored in canonical decimal form.
pub const KEY_USER_ID: &str = "user_id";
/// Storage key for the coarse permission tag.
pub const KEY_ROLE: &str = "role";
/// Storage key for the verified phone number.
pub const KEY_PHONE_NUMBER: &str = "phone_number";

/// Every key a session occupies, in the order they are written.
pub const SESSION_KEYS: [&str; 4] = [KEY_TOKEN, KEY_USER_ID, KEY_ROLE, KEY_PHONE_NUMBER];

/// Keychain service name for `KeyringStore` entries.
const SERVICE_NAME: &str = "newhope-mobile";

/// Session file name inside the app data directory.
const SESSION_FILE: &str = "session.json";

/// App directory name under the platform data directory.
const APP_DIR: &str = "newhope";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse session file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Durable key-value storage for the persisted session.
///
/// Writes are durable before the call returns. Reading a missing key
/// is not an error, and neither is removing one.
pub trait SessionStore: Send + Sync {
    /// Write a value under a key, overwriting silently.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read a value; a missing key yields `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete one key; removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Delete every session key.
    fn clear(&self) -> Result<(), StoreError> {
        for key in SESSION_KEYS {
            self.remove(key)?;
        }
        Ok(())
    }
}

// ============================================================================
// KeyringStore
// ============================================================================

/// Session storage in the OS keychain, one entry per key.
#[derive(Debug, Default)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        KeyringStore
    }

    fn entry(key: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(SERVICE_NAME, key)?)
    }
}

impl SessionStore for KeyringStore {
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::entry(key)?.set_password(value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// Session storage in a JSON file, for platforms without a keychain.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes the read-modify-write cycle on the backing file.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Open the store at the platform default location.
    pub fn open_default() -> Result<Self, StoreError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoreError::Unavailable("no platform data directory".to_string()))?;
        Ok(Self::new(data_dir.join(APP_DIR).join(SESSION_FILE)))
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            debug!(path = %self.path.display(), "session file removed");
        }
        Ok(())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-process session storage with failure injection, for tests and
/// embedding. Counts clear calls so forced sign-out behavior can be
/// asserted precisely.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
    unavailable: AtomicBool,
    clear_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of times `clear` has been invoked.
    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
