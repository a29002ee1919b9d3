use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

/// Keyring service name under which token entries are stored
const SERVICE_NAME: &str = "vikmo";

/// Storage key for the short-lived access token
const ACCESS_KEY: &str = "access";

/// Storage key for the long-lived refresh token
const REFRESH_KEY: &str = "refresh";

/// Backing storage for token entries.
///
/// Each token is an independent keyed entry, so either may be absent on
/// its own. Implementations must be callable from concurrent tasks;
/// operations are atomic at the granularity of a single key.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Token storage backed by the OS keychain
pub struct KeyringTokenStorage {
    service: String,
}

impl KeyringTokenStorage {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a custom keyring service name (e.g. per deployment)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// In-memory token storage for tests and embedded use.
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Process-wide holder of the current access and refresh tokens.
///
/// Tokens are opaque strings; the store performs no validation. They
/// are mutated only by successful login, successful refresh, explicit
/// logout, and failed refresh (which clears both). Storage failures are
/// logged and degrade to "token absent" rather than erroring on
/// request paths.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by the OS keychain
    pub fn keyring() -> Self {
        Self::new(Arc::new(KeyringTokenStorage::new()))
    }

    /// Store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::new()))
    }

    pub fn access(&self) -> Option<String> {
        self.read(ACCESS_KEY)
    }

    pub fn refresh(&self) -> Option<String> {
        self.read(REFRESH_KEY)
    }

    /// Persist a new access token, leaving the refresh token untouched
    pub fn set_access(&self, token: &str) {
        self.write(ACCESS_KEY, token);
    }

    /// Persist both tokens, overwriting any prior session
    pub fn set_session(&self, access: &str, refresh: &str) {
        self.write(ACCESS_KEY, access);
        self.write(REFRESH_KEY, refresh);
    }

    /// Remove both tokens (logout, or unrecoverable refresh failure)
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(ACCESS_KEY) {
            warn!(error = %e, "failed to remove access token");
        }
        if let Err(e) = self.storage.remove(REFRESH_KEY) {
            warn!(error = %e, "failed to remove refresh token");
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read token");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key, error = %e, "failed to store token");
        }
    }
}
