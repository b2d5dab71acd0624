//! Sensor descriptions rendered by a host for each account and tank.
//!
//! Sensors hold no state. Each description carries a value function that is
//! evaluated against the current snapshot on every read, so a host only keeps
//! the `installed_product_id` and looks the tank up again each cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::derive;
use crate::models::{AccountSnapshot, OrderDetail, TankSnapshot};

/// Gallons.
pub const UNIT_GALLONS: &str = "gal";
/// US dollars.
pub const UNIT_USD: &str = "USD";
/// Percent.
pub const UNIT_PERCENT: &str = "%";

// ============================================================================
// Sensor Value
// ============================================================================

/// The value a sensor reports on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// A numeric measurement.
    Number(f64),
    /// A point in time.
    Timestamp(DateTime<Utc>),
    /// Not enough data to report a value.
    Absent,
}

impl SensorValue {
    /// Returns true if the sensor has no value.
    pub fn is_absent(&self) -> bool {
        matches!(self, SensorValue::Absent)
    }

    /// Returns the numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<Option<f64>> for SensorValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(SensorValue::Absent, SensorValue::Number)
    }
}

impl From<Option<DateTime<Utc>>> for SensorValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(SensorValue::Absent, SensorValue::Timestamp)
    }
}

// ============================================================================
// Descriptions
// ============================================================================

/// Value function for a per-tank sensor.
pub type TankValueFn = fn(&TankSnapshot, &AccountSnapshot) -> SensorValue;

/// Static description of a per-tank sensor.
#[derive(Debug, Clone, Copy)]
pub struct TankSensor {
    /// Stable key, part of the unique id.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit of measurement.
    pub unit: Option<&'static str>,
    /// Suggested display precision.
    pub precision: Option<usize>,
    /// Diagnostic sensors are hidden by default.
    pub diagnostic: bool,
    /// Computes the value from the current snapshot.
    pub value_fn: TankValueFn,
}

impl TankSensor {
    /// Unique id of this sensor for a given tank.
    pub fn unique_id(&self, account_id: &str, installed_product_id: &str) -> String {
        format!("{account_id}_{installed_product_id}_{}", self.key)
    }

    /// Evaluates the sensor for the tank with the given id.
    ///
    /// Returns `Absent` when the tank is no longer part of the snapshot.
    pub fn value(&self, account: &AccountSnapshot, installed_product_id: &str) -> SensorValue {
        account
            .tank(installed_product_id)
            .map_or(SensorValue::Absent, |tank| (self.value_fn)(tank, account))
    }
}

/// Static description of an account-level sensor.
#[derive(Debug, Clone, Copy)]
pub struct AccountSensor {
    /// Stable key, part of the unique id.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit of measurement.
    pub unit: Option<&'static str>,
    /// Computes the value from the current snapshot.
    pub value_fn: fn(&AccountSnapshot) -> SensorValue,
}

impl AccountSensor {
    /// Unique id of this sensor for an account.
    pub fn unique_id(&self, account_id: &str) -> String {
        format!("{account_id}_{}", self.key)
    }
}

/// Static description of a per-tank on/off sensor.
#[derive(Debug, Clone, Copy)]
pub struct TankBinarySensor {
    /// Stable key, part of the unique id.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Computes the state given the configured threshold.
    pub is_on_fn: fn(&TankSnapshot, u8) -> Option<bool>,
}

impl TankBinarySensor {
    /// Unique id of this sensor for a given tank.
    pub fn unique_id(&self, account_id: &str, installed_product_id: &str) -> String {
        format!("{account_id}_{installed_product_id}_{}", self.key)
    }

    /// Evaluates the sensor for the tank with the given id.
    pub fn is_on(
        &self,
        account: &AccountSnapshot,
        installed_product_id: &str,
        threshold: u8,
    ) -> Option<bool> {
        account
            .tank(installed_product_id)
            .and_then(|tank| (self.is_on_fn)(tank, threshold))
    }
}

// ============================================================================
// Sensor Tables
// ============================================================================

fn last_delivery_number(
    tank: &TankSnapshot,
    f: fn(&OrderDetail) -> Option<f64>,
) -> SensorValue {
    tank.last_delivery.as_ref().and_then(f).into()
}

/// All per-tank sensors, in display order.
pub static TANK_SENSORS: &[TankSensor] = &[
    TankSensor {
        key: "tank_level",
        name: "Tank level",
        unit: Some(UNIT_PERCENT),
        precision: None,
        diagnostic: false,
        value_fn: |tank, _| tank.current_percent.into(),
    },
    TankSensor {
        key: "estimated_gallons",
        name: "Estimated gallons",
        unit: Some(UNIT_GALLONS),
        precision: None,
        diagnostic: false,
        value_fn: |tank, _| derive::estimated_gallons(tank).into(),
    },
    TankSensor {
        key: "estimated_value",
        name: "Estimated value",
        unit: Some(UNIT_USD),
        precision: Some(2),
        diagnostic: false,
        value_fn: |tank, _| derive::estimated_value(tank).into(),
    },
    TankSensor {
        key: "tank_capacity",
        name: "Tank capacity",
        unit: Some(UNIT_GALLONS),
        precision: None,
        diagnostic: true,
        value_fn: |tank, _| tank.full_capacity.into(),
    },
    TankSensor {
        key: "fill_capacity",
        name: "Fill capacity",
        unit: Some(UNIT_GALLONS),
        precision: None,
        diagnostic: true,
        value_fn: |tank, _| tank.fill_capacity.into(),
    },
    TankSensor {
        key: "last_reading_date",
        name: "Last reading",
        unit: None,
        precision: None,
        diagnostic: true,
        value_fn: |tank, _| tank.reading_timestamp.into(),
    },
    TankSensor {
        key: "last_delivery_date",
        name: "Last delivery",
        unit: None,
        precision: None,
        diagnostic: false,
        value_fn: |tank, _| tank.last_delivery.as_ref().and_then(|d| d.complete_date).into(),
    },
    TankSensor {
        key: "last_delivery_gallons",
        name: "Last delivery gallons",
        unit: Some(UNIT_GALLONS),
        precision: None,
        diagnostic: false,
        value_fn: |tank, _| last_delivery_number(tank, |d| d.propane_gallons),
    },
    TankSensor {
        key: "last_price_per_gallon",
        name: "Last price per gallon",
        unit: Some(UNIT_USD),
        precision: Some(4),
        diagnostic: false,
        value_fn: |tank, _| last_delivery_number(tank, |d| d.propane_price_per_gallon),
    },
    TankSensor {
        key: "last_delivery_total",
        name: "Last delivery total",
        unit: Some(UNIT_USD),
        precision: Some(2),
        diagnostic: false,
        value_fn: |tank, _| last_delivery_number(tank, |d| Some(d.grand_total)),
    },
    TankSensor {
        key: "gallons_used_since_fill",
        name: "Gallons used since fill",
        unit: Some(UNIT_GALLONS),
        precision: None,
        diagnostic: false,
        value_fn: |tank, _| derive::gallons_used_since_fill(tank).into(),
    },
    TankSensor {
        key: "estimated_usage_cost",
        name: "Estimated usage cost",
        unit: Some(UNIT_USD),
        precision: Some(2),
        diagnostic: false,
        value_fn: |tank, _| derive::usage_cost_since_fill(tank).into(),
    },
];

/// Account balance sensor.
pub static ACCOUNT_BALANCE_SENSOR: AccountSensor = AccountSensor {
    key: "account_balance",
    name: "Account balance",
    unit: Some(UNIT_USD),
    value_fn: |account| account.balance.into(),
};

/// Low propane indicator, on when the level is below the threshold.
pub static LOW_PROPANE_SENSOR: TankBinarySensor = TankBinarySensor {
    key: "low_propane",
    name: "Low propane",
    is_on_fn: derive::is_low_propane,
};

/// Looks up a tank sensor by key.
pub fn tank_sensor(key: &str) -> Option<&'static TankSensor> {
    TANK_SENSORS.iter().find(|s| s.key == key)
}
