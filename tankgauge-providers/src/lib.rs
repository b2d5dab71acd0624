// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TankGauge` Providers
//!
//! Provider-specific implementations for the `TankGauge` application.
//!
//! Each provider module includes:
//!
//! - **API client**: Endpoints and login handshake
//! - **Parser**: Defensive JSON parsing into core snapshot types
//! - **Pipeline**: A [`tankgauge_core::SnapshotProvider`] implementation
//! - **Credential store**: Keychain and environment credential loading
//!
//! ## Supported Providers
//!
//! | Provider | Auth | Data |
//! |----------|------|------|
//! | Ferrellgas | Username/password login, bearer token | Account balance, tank levels, last delivery |
//!
//! ## Usage
//!
//! ```ignore
//! use tankgauge_core::SnapshotProvider;
//! use tankgauge_providers::FerrellgasPipeline;
//!
//! let pipeline = FerrellgasPipeline::new(&ctx);
//! let snapshot = pipeline.refresh(&credentials, "123456").await?;
//! ```

pub mod ferrellgas;

pub use ferrellgas::{
    FerrellgasApiClient, FerrellgasCredentialStore, FerrellgasError, FerrellgasPipeline,
};
