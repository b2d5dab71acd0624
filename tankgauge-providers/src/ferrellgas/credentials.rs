//! Ferrellgas credential storage.
//!
//! Credentials are loaded from, in order:
//!
//! 1. **Keychain** - username and password entries under the `ferrellgas`
//!    service
//! 2. **Environment** - `TANKGAUGE_USERNAME` and `TANKGAUGE_PASSWORD`

use std::sync::Arc;

use tankgauge_core::Credentials;
use tankgauge_fetch::KeychainApi;
use tankgauge_fetch::host::keychain::{accounts, services};
use tracing::{debug, instrument, warn};

use super::error::FerrellgasError;

/// Environment variable for the portal username.
pub const USERNAME_ENV: &str = "TANKGAUGE_USERNAME";

/// Environment variable for the portal password.
pub const PASSWORD_ENV: &str = "TANKGAUGE_PASSWORD";

/// Ferrellgas credential store.
#[derive(Clone)]
pub struct FerrellgasCredentialStore {
    keychain: Arc<dyn KeychainApi>,
}

impl std::fmt::Debug for FerrellgasCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FerrellgasCredentialStore")
            .finish_non_exhaustive()
    }
}

impl FerrellgasCredentialStore {
    /// Creates a store backed by the given keychain.
    pub fn new(keychain: Arc<dyn KeychainApi>) -> Self {
        Self { keychain }
    }

    /// Loads credentials from any available source.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Credentials, FerrellgasError> {
        match self.load_from_keychain().await {
            Ok(Some(credentials)) => {
                debug!(source = "keychain", "Loaded credentials");
                return Ok(credentials);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Keychain lookup failed, trying environment"),
        }

        if let Some(credentials) = Self::load_from_env() {
            debug!(source = "env", "Loaded credentials");
            return Ok(credentials);
        }

        Err(FerrellgasError::NoCredentials)
    }

    /// Loads credentials from the keychain. Both entries must be present.
    pub async fn load_from_keychain(&self) -> Result<Option<Credentials>, FerrellgasError> {
        let username = self
            .keychain
            .get(services::FERRELLGAS, accounts::USERNAME)
            .await
            .map_err(|e| FerrellgasError::Keychain(e.to_string()))?;
        let Some(username) = username else {
            return Ok(None);
        };

        let password = self
            .keychain
            .get(services::FERRELLGAS, accounts::PASSWORD)
            .await
            .map_err(|e| FerrellgasError::Keychain(e.to_string()))?;

        Ok(password.map(|password| Credentials::new(username, password)))
    }

    /// Loads credentials from the environment.
    pub fn load_from_env() -> Option<Credentials> {
        credentials_from_vars(
            std::env::var(USERNAME_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
        )
    }

    /// Saves credentials to the keychain.
    #[instrument(skip(self, credentials))]
    pub async fn save(&self, credentials: &Credentials) -> Result<(), FerrellgasError> {
        self.keychain
            .set(services::FERRELLGAS, accounts::USERNAME, &credentials.username)
            .await
            .map_err(|e| FerrellgasError::Keychain(e.to_string()))?;
        self.keychain
            .set(services::FERRELLGAS, accounts::PASSWORD, &credentials.password)
            .await
            .map_err(|e| FerrellgasError::Keychain(e.to_string()))?;
        debug!("Saved credentials to keychain");
        Ok(())
    }

    /// Removes stored credentials.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), FerrellgasError> {
        for account in [accounts::USERNAME, accounts::PASSWORD] {
            self.keychain
                .delete(services::FERRELLGAS, account)
                .await
                .map_err(|e| FerrellgasError::Keychain(e.to_string()))?;
        }
        Ok(())
    }
}

fn credentials_from_vars(username: Option<String>, password: Option<String>) -> Option<Credentials> {
    let username = username.filter(|u| !u.is_empty())?;
    let password = password.filter(|p| !p.is_empty())?;
    Some(Credentials::new(username, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankgauge_fetch::MemoryKeychain;

    fn store() -> FerrellgasCredentialStore {
        FerrellgasCredentialStore::new(Arc::new(MemoryKeychain::new()))
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = store();
        let creds = Credentials::new("user@example.com", "hunter2");
        store.save(&creds).await.unwrap();

        assert_eq!(store.load_from_keychain().await.unwrap(), Some(creds));
    }

    #[tokio::test]
    async fn test_partial_keychain_entry_is_absent() {
        let keychain = Arc::new(MemoryKeychain::new());
        keychain
            .set(services::FERRELLGAS, accounts::USERNAME, "user")
            .await
            .unwrap();

        let store = FerrellgasCredentialStore::new(keychain);
        assert_eq!(store.load_from_keychain().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = store();
        store.save(&Credentials::new("u", "p")).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load_from_keychain().await.unwrap(), None);
    }

    #[test]
    fn test_credentials_from_vars() {
        assert_eq!(
            credentials_from_vars(Some("u".into()), Some("p".into())),
            Some(Credentials::new("u", "p"))
        );
        assert_eq!(credentials_from_vars(Some("u".into()), None), None);
        assert_eq!(credentials_from_vars(Some(String::new()), Some("p".into())), None);
    }
}
