//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials rejected, token missing, or HTTP 401/403.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network-level failure: DNS, refused connection, timeout.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Unexpected status, non-JSON body, or wrong payload shape.
    #[error("API error: {0}")]
    Api(String),

    /// The request could not be built (invalid header value, bad client
    /// configuration).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Keychain error.
    #[error("Keychain error: {0}")]
    Keychain(#[from] KeychainError),
}

impl FetchError {
    /// Returns true if the host should prompt for new credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::AuthenticationFailed(_))
    }

    /// Returns true if the next scheduled cycle may succeed without user
    /// action.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Connection(_) | FetchError::Api(_))
    }
}

// ============================================================================
// Keychain Error
// ============================================================================

/// Error type for keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Credential not found.
    #[error("Credential not found for {service}/{account}")]
    NotFound {
        /// Service name.
        service: String,
        /// Account name.
        account: String,
    },

    /// Access denied.
    #[error("Access denied to keychain")]
    AccessDenied,

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Generic error.
    #[error("Keychain error: {0}")]
    Other(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => KeychainError::NotFound {
                service: String::new(),
                account: String::new(),
            },
            keyring::Error::PlatformFailure(e) => KeychainError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => KeychainError::AccessDenied,
            _ => KeychainError::Other(err.to_string()),
        }
    }
}
