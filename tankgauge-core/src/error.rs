//! Core error types for `TankGauge`.

use thiserror::Error;

/// Core error type for `TankGauge` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credentials were rejected or are missing.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The provider could not be reached or returned an unusable response.
    #[error("Update failed: {0}")]
    UpdateFailed(String),
}

impl CoreError {
    /// Returns true if the host should ask the user to re-enter credentials.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, CoreError::Authentication(_))
    }
}
