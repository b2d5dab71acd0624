//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, RefreshOutput};
pub use text::TextFormatter;

use serde::Serialize;
use tankgauge_core::{
    ACCOUNT_BALANCE_SENSOR, AccountSnapshot, LOW_PROPANE_SENSOR, SensorValue, TANK_SENSORS,
};

// ============================================================================
// Sensor Readings
// ============================================================================

/// A sensor's state at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Numeric or timestamp sensor.
    Measurement(SensorValue),
    /// On/off sensor; `None` when unknown.
    State(Option<bool>),
}

/// One evaluated sensor, flattened for display.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    /// Stable unique id.
    pub unique_id: String,
    /// Display name.
    pub name: &'static str,
    /// Tank the reading belongs to; `None` for account-level sensors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_product_id: Option<String>,
    /// Current value.
    pub value: ReadingValue,
    /// Unit of measurement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    /// Display precision.
    #[serde(skip)]
    pub precision: Option<usize>,
    /// Diagnostic sensors are hidden from the default text view.
    pub diagnostic: bool,
}

/// Evaluates every sensor for an account snapshot.
///
/// Account sensors come first, then each tank's sensors in table order
/// followed by its low-propane indicator.
pub fn sensor_readings(snapshot: &AccountSnapshot, threshold: u8) -> Vec<SensorReading> {
    let account_id = snapshot.account_id.as_str();
    let mut readings = vec![SensorReading {
        unique_id: ACCOUNT_BALANCE_SENSOR.unique_id(account_id),
        name: ACCOUNT_BALANCE_SENSOR.name,
        installed_product_id: None,
        value: ReadingValue::Measurement((ACCOUNT_BALANCE_SENSOR.value_fn)(snapshot)),
        unit: ACCOUNT_BALANCE_SENSOR.unit,
        precision: Some(2),
        diagnostic: false,
    }];

    for tank_id in snapshot.tank_ids() {
        readings.extend(TANK_SENSORS.iter().map(|sensor| SensorReading {
            unique_id: sensor.unique_id(account_id, tank_id),
            name: sensor.name,
            installed_product_id: Some(tank_id.to_string()),
            value: ReadingValue::Measurement(sensor.value(snapshot, tank_id)),
            unit: sensor.unit,
            precision: sensor.precision,
            diagnostic: sensor.diagnostic,
        }));

        readings.push(SensorReading {
            unique_id: LOW_PROPANE_SENSOR.unique_id(account_id, tank_id),
            name: LOW_PROPANE_SENSOR.name,
            installed_product_id: Some(tank_id.to_string()),
            value: ReadingValue::State(LOW_PROPANE_SENSOR.is_on(snapshot, tank_id, threshold)),
            unit: None,
            precision: None,
            diagnostic: false,
        });
    }

    readings
}
