//! Trait definitions for `TankGauge`.
//!
//! This module defines the seam between a host scheduler and the provider
//! pipeline that produces account snapshots.

use std::fmt;

use crate::error::CoreError;
use crate::models::AccountSnapshot;

/// Username/password pair for the provider portal.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Portal username (usually an email address).
    pub username: String,
    /// Portal password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A source of account snapshots.
///
/// Implementors are responsible for:
/// - Authenticating with the provider on every call (no token reuse)
/// - Fetching the account summary and per-tank delivery history
/// - Parsing the responses into a fresh [`AccountSnapshot`]
///
/// Errors are classified so the host can tell a credential problem
/// ([`CoreError::Authentication`]) from a transient one
/// ([`CoreError::UpdateFailed`]).
pub trait SnapshotProvider: Send + Sync {
    /// Returns the display name of the provider.
    fn name(&self) -> &str;

    /// Lists the account ids visible to these credentials.
    fn accounts(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<Vec<String>, CoreError>> + Send;

    /// Builds a new snapshot for one account.
    fn refresh(
        &self,
        credentials: &Credentials,
        account_id: &str,
    ) -> impl std::future::Future<Output = Result<AccountSnapshot, CoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("user@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
