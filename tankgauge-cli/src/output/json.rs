//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tankgauge_core::AccountSnapshot;
use tankgauge_store::RefreshStatus;

use super::{SensorReading, sensor_readings};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one refresh.
#[derive(Debug, Serialize)]
pub struct RefreshOutput<'a> {
    pub account_id: &'a str,
    pub status: RefreshStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    /// Last good snapshot, kept across failed refreshes.
    pub snapshot: Option<&'a AccountSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sensors: Vec<SensorReading>,
}

impl<'a> RefreshOutput<'a> {
    /// Builds the output for a refresh, with no sensor readings.
    pub fn new(
        account_id: &'a str,
        status: RefreshStatus,
        snapshot: Option<&'a AccountSnapshot>,
    ) -> Self {
        Self {
            account_id,
            status,
            last_error: None,
            last_success: None,
            snapshot,
            sensors: Vec::new(),
        }
    }

    /// Records the failure message and time of the last success.
    #[must_use]
    pub fn with_history(
        mut self,
        last_error: Option<String>,
        last_success: Option<DateTime<Utc>>,
    ) -> Self {
        self.last_error = last_error;
        self.last_success = last_success;
        self
    }

    /// Adds every sensor reading for the snapshot.
    #[must_use]
    pub fn with_sensors(mut self, threshold: u8) -> Self {
        self.sensors = self
            .snapshot
            .map(|s| sensor_readings(s, threshold))
            .unwrap_or_default();
        self
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON output formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }
}
