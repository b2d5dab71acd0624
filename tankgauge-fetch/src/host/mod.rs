//! Host APIs for `TankGauge` fetches.
//!
//! - [`http`] - JSON HTTP client with tracing and failure classification
//! - [`keychain`] - Secure credential storage (system keychain)

pub mod http;
pub mod keychain;

// Re-export key types
pub use http::HttpClient;
pub use keychain::{KeychainApi, MemoryKeychain, SystemKeychain};
