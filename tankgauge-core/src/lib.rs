// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TankGauge` Core
//!
//! Core types, derived metrics, and sensor descriptions for the `TankGauge`
//! application.
//!
//! This crate provides the foundational abstractions used across all other
//! `TankGauge` crates, including:
//!
//! - Domain models (accounts, tanks, delivery orders)
//! - Derived values computed on read (gallons, value, usage since fill)
//! - Sensor descriptions a host renders per tank
//! - Error types and the snapshot provider trait
//!
//! ## Key Types
//!
//! ### Snapshot Types
//! - [`AccountSnapshot`] - One refresh cycle's view of an account
//! - [`TankSnapshot`] - A single installed tank
//! - [`OrderDetail`] - The most recent delivery attached to a tank
//! - [`OrderLine`] - One line item of an order
//!
//! ### Sensors
//! - [`TankSensor`] - Static description of a per-tank sensor
//! - [`SensorValue`] - The value a sensor reports on read

pub mod derive;
pub mod error;
pub mod models;
pub mod sensors;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{AccountSnapshot, OrderDetail, OrderLine, TankSnapshot, product_codes};

// Re-export sensor types
pub use sensors::{
    ACCOUNT_BALANCE_SENSOR, AccountSensor, LOW_PROPANE_SENSOR, SensorValue, TANK_SENSORS,
    TankBinarySensor, TankSensor, tank_sensor,
};

// Re-export traits
pub use traits::{Credentials, SnapshotProvider};
