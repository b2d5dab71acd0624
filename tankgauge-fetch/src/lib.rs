// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TankGauge` Fetch
//!
//! HTTP transport and host APIs for the `TankGauge` application.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::http`] - JSON HTTP client with a fixed timeout and response
//!   classification
//! - [`host::keychain`] - Secure credential storage (system keychain)
//!
//! ## Error Taxonomy
//!
//! Every network call resolves to one of three failure kinds:
//!
//! - [`FetchError::AuthenticationFailed`] - rejected credentials, HTTP 401/403
//! - [`FetchError::Connection`] - DNS, refused connection, timeout
//! - [`FetchError::Api`] - other HTTP errors, non-JSON or wrong-shape bodies
//!
//! ## Example
//!
//! ```ignore
//! use tankgauge_fetch::{FetchContext, host::http::bearer_headers};
//!
//! let ctx = FetchContext::builder().build()?;
//! let body = ctx.http.get_json(url, bearer_headers(&token)?).await?;
//! ```

pub mod context;
pub mod error;
pub mod host;

// Errors
pub use error::{FetchError, KeychainError};

// Host APIs
pub use host::{
    http::{HttpClient, REQUEST_TIMEOUT, bearer_headers},
    keychain::{KeychainApi, MemoryKeychain, SystemKeychain},
};

// Context
pub use context::{FetchContext, FetchContextBuilder};
