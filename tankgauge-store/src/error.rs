//! Store error types.

use tankgauge_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A refresh for this account is already running.
    #[error("Refresh already in progress for {0}")]
    RefreshInProgress(String),

    /// The provider refresh failed.
    #[error("Refresh failed: {0}")]
    Refresh(#[from] CoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Refresh(e) => !e.requires_reauth(),
            StoreError::RefreshInProgress(_) | StoreError::Io(_) => true,
            StoreError::Serialization(_) | StoreError::Config(_) => false,
        }
    }

    /// Returns true if the user must re-enter credentials.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, StoreError::Refresh(e) if e.requires_reauth())
    }
}
