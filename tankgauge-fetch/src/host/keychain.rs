//! Portal secrets in the platform credential store.
//!
//! Entries are addressed by a service and an account name. The system
//! implementation namespaces every service as `tankgauge:<service>`;
//! [`MemoryKeychain`] keeps entries in process for tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::KeychainError;

/// Service names used by `TankGauge`.
pub mod services {
    /// Ferrellgas customer portal.
    pub const FERRELLGAS: &str = "ferrellgas";
}

/// Account names stored under a service.
pub mod accounts {
    /// Portal username.
    pub const USERNAME: &str = "username";
    /// Portal password.
    pub const PASSWORD: &str = "password";
}

/// Read, write and remove one secret.
#[async_trait]
pub trait KeychainApi: Send + Sync {
    /// Returns the secret, or `None` when no non-empty entry exists.
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError>;

    /// Stores or replaces a secret.
    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;

    /// Removes a secret. A missing entry is not an error.
    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError>;
}

// ============================================================================
// System Keychain
// ============================================================================

/// Keychain Services, Credential Manager or Secret Service via `keyring`.
#[derive(Debug, Clone, Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    /// Creates a handle to the platform store.
    pub fn new() -> Self {
        Self
    }

    fn service_name(service: &str) -> String {
        format!("tankgauge:{service}")
    }

    fn entry(service: &str, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&Self::service_name(service), account)
            .map_err(|e| KeychainError::Platform(e.to_string()))
    }
}

#[async_trait]
impl KeychainApi for SystemKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        match Self::entry(service, account)?.get_password() {
            Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(service, account, "No keychain entry");
                Ok(None)
            }
            Err(e) => {
                warn!(service, account, error = %e, "Keychain read failed");
                Err(e.into())
            }
        }
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        Self::entry(service, account)?
            .set_password(secret)
            .inspect(|()| debug!(service, account, "Keychain entry stored"))
            .map_err(|e| {
                warn!(service, account, error = %e, "Keychain write failed");
                e.into()
            })
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        match Self::entry(service, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!(service, account, error = %e, "Keychain delete failed");
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// In-Memory Keychain
// ============================================================================

/// Keychain held in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryKeychain {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeychain {
    /// Creates an empty keychain.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(service: &str, account: &str) -> String {
        format!("{service}/{account}")
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, KeychainError> {
        self.entries
            .lock()
            .map_err(|_| KeychainError::Other("keychain lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeychainApi for MemoryKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        let entries = self.entries()?;
        Ok(entries
            .get(&Self::key(service, account))
            .filter(|s| !s.is_empty())
            .cloned())
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        self.entries()?
            .insert(Self::key(service, account), secret.to_string());
        Ok(())
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        self.entries()?.remove(&Self::key(service, account));
        Ok(())
    }
}
