//! Derived values computed on read from a tank snapshot.
//!
//! Every function returns `None` when its inputs are incomplete. No value is
//! ever substituted with a default; rounding happens only here.

use crate::models::TankSnapshot;

/// Default low-propane threshold in percent.
pub const DEFAULT_LOW_PROPANE_THRESHOLD: u8 = 20;

/// Rounds `value` to `decimals` decimal places. Exact ties go to the even
/// neighbour, so `201.25` rounds to `201.2`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    (value * factor).round_ties_even() / factor
}

/// Unrounded gallons currently in the tank.
fn current_gallons(tank: &TankSnapshot) -> Option<f64> {
    let percent = tank.current_percent?;
    let capacity = tank.full_capacity?;
    Some(percent / 100.0 * capacity)
}

/// Unrounded gallons burned since the last fill.
///
/// Absent when the fill level is below the current estimate, which happens
/// when the provider's estimate is newer than its fill record.
fn used_gallons(tank: &TankSnapshot) -> Option<f64> {
    let fill = tank.fill_capacity?;
    let current = current_gallons(tank)?;
    (fill >= current).then(|| fill - current)
}

/// Estimated gallons in the tank, rounded to one decimal.
pub fn estimated_gallons(tank: &TankSnapshot) -> Option<f64> {
    current_gallons(tank).map(|g| round_to(g, 1))
}

/// Estimated dollar value of the propane in the tank at the last delivery
/// price, rounded to cents.
pub fn estimated_value(tank: &TankSnapshot) -> Option<f64> {
    let gallons = current_gallons(tank)?;
    let price = tank.last_price_per_gallon()?;
    Some(round_to(gallons * price, 2))
}

/// Gallons used since the last fill, rounded to one decimal.
pub fn gallons_used_since_fill(tank: &TankSnapshot) -> Option<f64> {
    used_gallons(tank).map(|g| round_to(g, 1))
}

/// Cost of the propane used since the last fill, rounded to cents.
pub fn usage_cost_since_fill(tank: &TankSnapshot) -> Option<f64> {
    let used = used_gallons(tank)?;
    let price = tank.last_price_per_gallon()?;
    Some(round_to(used * price, 2))
}

/// Whether the tank is below `threshold` percent.
pub fn is_low_propane(tank: &TankSnapshot, threshold: u8) -> Option<bool> {
    tank.current_percent.map(|p| p < f64::from(threshold))
}
