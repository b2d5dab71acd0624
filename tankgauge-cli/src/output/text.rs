//! Text output formatting with level bars and colors.

use chrono::{DateTime, Local, Utc};
use tankgauge_core::derive;
use tankgauge_core::{AccountSnapshot, OrderDetail, SensorValue, TankSnapshot};
use tankgauge_store::RefreshStatus;

use super::{ReadingValue, SensorReading};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Level bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Set the level bar width.
    #[allow(dead_code)]
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// Formats an account snapshot with every tank.
    pub fn format_account(&self, snapshot: &AccountSnapshot, threshold: u8) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} ({})",
            self.bold(&snapshot.account_name),
            snapshot.account_id
        ));
        if let Some(balance) = snapshot.balance {
            lines.push(format!("Balance: {}", self.format_money(balance)));
        }
        lines.push(self.dim(&format!(
            "Fetched {}",
            Self::format_timestamp(snapshot.fetched_at)
        )));

        if snapshot.tanks.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("No tanks on this account"));
        }

        for tank in &snapshot.tanks {
            lines.push(String::new());
            lines.push(self.format_tank(tank, threshold));
        }

        lines.join("\n")
    }

    /// Formats one tank: level, estimates and last delivery.
    pub fn format_tank(&self, tank: &TankSnapshot, threshold: u8) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} - {} [{}]",
            self.cyan(&tank.site_name),
            tank.product_description,
            tank.installed_product_id
        ));

        match tank.current_percent {
            Some(percent) => {
                let bar = self.level_bar(percent, threshold);
                let pct = self.color_for_level(percent, threshold, &format!("{percent:.0}%"));
                let mut line = format!("{:<10} {} {}", "Level:", bar, pct);
                if derive::is_low_propane(tank, threshold) == Some(true) {
                    line.push_str(&format!(" {}", self.red("LOW")));
                }
                lines.push(line);
            }
            None => lines.push(format!("{:<10} {}", "Level:", self.dim("unknown"))),
        }

        if let Some(gallons) = derive::estimated_gallons(tank) {
            let mut line = format!("{:<10} {gallons:.1} gal", "Estimate:");
            if let Some(capacity) = tank.full_capacity {
                line.push_str(&format!(" of {capacity:.0}"));
            }
            if let Some(value) = derive::estimated_value(tank) {
                line.push_str(&format!(" ({})", self.format_money(value)));
            }
            lines.push(line);
        }

        if let Some(used) = derive::gallons_used_since_fill(tank) {
            let mut line = format!("{:<10} {used:.1} gal since fill", "Used:");
            if let Some(cost) = derive::usage_cost_since_fill(tank) {
                line.push_str(&format!(" ({})", self.format_money(cost)));
            }
            lines.push(line);
        }

        if let Some(read_at) = tank.reading_timestamp {
            lines.push(format!(
                "{:<10} {}",
                "Reading:",
                self.dim(&Self::format_timestamp(read_at))
            ));
        }

        match &tank.last_delivery {
            Some(delivery) => lines.push(self.format_delivery(delivery)),
            None => lines.push(format!("{:<10} {}", "Delivery:", self.dim("none on record"))),
        }

        lines.join("\n")
    }

    /// Formats the last delivery on one line.
    pub fn format_delivery(&self, delivery: &OrderDetail) -> String {
        let date = delivery
            .complete_date
            .or(delivery.order_date)
            .map_or_else(|| "date unknown".to_string(), Self::format_timestamp);

        let mut parts = vec![date];
        if let Some(gallons) = delivery.propane_gallons {
            parts.push(format!("{gallons:.1} gal"));
        }
        if let Some(price) = delivery.propane_price_per_gallon {
            parts.push(format!("${price:.4}/gal"));
        }
        parts.push(format!("total {}", self.format_money(delivery.grand_total)));

        format!("{:<10} {}", "Delivery:", parts.join(", "))
    }

    /// Formats the outcome of the last refresh.
    pub fn format_status(&self, status: RefreshStatus, last_error: Option<&str>) -> String {
        let label = match status {
            RefreshStatus::Fresh => self.green(&status.to_string()),
            RefreshStatus::Pending => self.dim(&status.to_string()),
            RefreshStatus::Stale => self.yellow(&status.to_string()),
            RefreshStatus::ReauthRequired => self.red(&status.to_string()),
        };

        match last_error {
            Some(error) => format!("Status: {label} - {error}"),
            None => format!("Status: {label}"),
        }
    }

    /// Formats sensor readings as an aligned table grouped by tank.
    pub fn format_sensors(&self, readings: &[SensorReading], show_diagnostic: bool) -> String {
        let mut lines = Vec::new();
        let mut current_tank: Option<&str> = None;

        for reading in readings.iter().filter(|r| show_diagnostic || !r.diagnostic) {
            let tank = reading.installed_product_id.as_deref();
            if tank != current_tank {
                if let Some(id) = tank {
                    lines.push(String::new());
                    lines.push(self.bold(&format!("Tank {id}")));
                }
                current_tank = tank;
            }

            lines.push(format!(
                "  {:<24} {}  {}",
                reading.name,
                self.format_reading(reading),
                self.dim(&reading.unique_id)
            ));
        }

        lines.join("\n")
    }

    /// Formats a sensor value with its unit.
    pub fn format_reading(&self, reading: &SensorReading) -> String {
        match reading.value {
            ReadingValue::Measurement(SensorValue::Number(n)) => {
                let number = match reading.precision {
                    Some(p) => format!("{n:.p$}"),
                    None => n.to_string(),
                };
                match reading.unit {
                    Some("%") => format!("{number}%"),
                    Some(unit) => format!("{number} {unit}"),
                    None => number,
                }
            }
            ReadingValue::Measurement(SensorValue::Timestamp(ts)) => Self::format_timestamp(ts),
            ReadingValue::Measurement(SensorValue::Absent) | ReadingValue::State(None) => {
                self.dim("unknown")
            }
            ReadingValue::State(Some(true)) => self.red("on"),
            ReadingValue::State(Some(false)) => "off".to_string(),
        }
    }

    /// Formats a list of account ids, marking the selected one.
    pub fn format_accounts(&self, ids: &[String], selected: Option<&str>) -> String {
        if ids.is_empty() {
            return self.dim("No accounts found");
        }

        ids.iter()
            .map(|id| {
                if Some(id.as_str()) == selected {
                    format!("* {}", self.bold(id))
                } else {
                    format!("  {id}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats a tank level bar.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn level_bar(&self, percent: f64, threshold: u8) -> String {
        let clamped = percent.clamp(0.0, 100.0);
        let filled = ((clamped / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_level(percent, threshold, &bar)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_level(&self, percent: f64, threshold: u8, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < f64::from(threshold) {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn format_money(&self, amount: f64) -> String {
        let text = if amount < 0.0 {
            format!("-${:.2}", amount.abs())
        } else {
            format!("${amount:.2}")
        };
        self.green(&text)
    }

    fn format_timestamp(ts: DateTime<Utc>) -> String {
        ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
