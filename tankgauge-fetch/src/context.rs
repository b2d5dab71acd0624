//! Fetch context providing access to host APIs.
//!
//! The fetch context is handed to provider pipelines and bundles the HTTP
//! client with the credential store.

use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchError;
use crate::host::{
    http::{HttpClient, REQUEST_TIMEOUT},
    keychain::{KeychainApi, SystemKeychain},
};

// ============================================================================
// Fetch Context
// ============================================================================

/// Context provided to provider pipelines.
pub struct FetchContext {
    /// Secure credential storage.
    pub keychain: Arc<dyn KeychainApi>,
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    timeout: Duration,
}

impl FetchContext {
    /// Creates a new fetch context with default host API implementations.
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    keychain: Option<Arc<dyn KeychainApi>>,
    http: Option<Arc<HttpClient>>,
    timeout: Duration,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            keychain: None,
            http: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Sets the keychain implementation.
    pub fn keychain(mut self, keychain: Arc<dyn KeychainApi>) -> Self {
        self.keychain = Some(keychain);
        self
    }

    /// Sets the HTTP client. Overrides [`Self::timeout`].
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the per-request timeout used when building the HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> Result<FetchContext, FetchError> {
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(HttpClient::with_timeout(self.timeout)?),
        };

        Ok(FetchContext {
            keychain: self
                .keychain
                .unwrap_or_else(|| Arc::new(SystemKeychain::new())),
            http,
            timeout: self.timeout,
        })
    }
}

impl Default for FetchContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
