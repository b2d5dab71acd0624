//! Ferrellgas-specific errors.

use tankgauge_core::CoreError;
use tankgauge_fetch::FetchError;
use thiserror::Error;

/// Ferrellgas-specific errors.
#[derive(Debug, Error)]
pub enum FerrellgasError {
    /// Credentials rejected, token missing, or HTTP 401/403.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network-level failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Unexpected status or response shape.
    #[error("API error: {0}")]
    Api(String),

    /// No stored credentials.
    #[error("No credentials found")]
    NoCredentials,

    /// Keychain access failed.
    #[error("Keychain error: {0}")]
    Keychain(String),
}

impl FerrellgasError {
    /// Returns true if the user must re-enter credentials.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            FerrellgasError::AuthenticationFailed(_) | FerrellgasError::NoCredentials
        )
    }
}

impl From<FetchError> for FerrellgasError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AuthenticationFailed(msg) => FerrellgasError::AuthenticationFailed(msg),
            FetchError::Connection(msg) => FerrellgasError::Connection(msg),
            FetchError::Api(msg) | FetchError::InvalidRequest(msg) => FerrellgasError::Api(msg),
            FetchError::Keychain(e) => FerrellgasError::Keychain(e.to_string()),
        }
    }
}

impl From<FerrellgasError> for CoreError {
    fn from(err: FerrellgasError) -> Self {
        if err.is_auth() {
            CoreError::Authentication(err.to_string())
        } else {
            CoreError::UpdateFailed(err.to_string())
        }
    }
}
