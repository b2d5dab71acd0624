// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TankGauge` Store
//!
//! State management for the `TankGauge` application.
//!
//! This crate provides:
//!
//! - **`SettingsStore`**: User preferences with validation and persistence
//! - **`SnapshotStore`**: Latest account snapshot and refresh status
//! - **`RefreshCoordinator`**: Single-flight refreshes with error
//!   classification
//! - **Persistence**: Settings file location and owner-only writes
//!
//! ## Usage
//!
//! ```ignore
//! use tankgauge_store::{RefreshConfig, RefreshCoordinator, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await.get().await;
//! let coordinator = RefreshCoordinator::new(pipeline, account_id, RefreshConfig::from(&settings));
//!
//! let mut rx = coordinator.store().subscribe();
//! coordinator.refresh(&credentials).await?;
//! ```

pub mod coordinator;
pub mod error;
pub mod persistence;
pub mod settings_store;
pub mod snapshot_store;

pub use coordinator::{RefreshConfig, RefreshCoordinator};
pub use error::StoreError;
pub use persistence::{default_config_dir, default_settings_path};
pub use settings_store::{
    DEFAULT_SCAN_INTERVAL_MINUTES, LogLevel, MAX_LOW_PROPANE_THRESHOLD, MAX_SCAN_INTERVAL_MINUTES,
    MIN_LOW_PROPANE_THRESHOLD, MIN_SCAN_INTERVAL_MINUTES, Settings, SettingsStore,
};
pub use snapshot_store::{RefreshStatus, SnapshotStore};
