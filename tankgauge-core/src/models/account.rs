//! Account and tank snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::OrderDetail;

// ============================================================================
// Account Snapshot
// ============================================================================

/// A point-in-time view of one provider account.
///
/// Built once per refresh cycle and never mutated afterwards; the next cycle
/// produces a new snapshot that replaces this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Provider account identifier.
    pub account_id: String,
    /// Display name (falls back to the account id).
    pub account_name: String,
    /// Outstanding account balance in USD, when reported.
    pub balance: Option<f64>,
    /// Installed tanks in provider order.
    pub tanks: Vec<TankSnapshot>,
    /// When this snapshot was assembled.
    pub fetched_at: DateTime<Utc>,
}

impl AccountSnapshot {
    /// Creates an empty snapshot for an account.
    pub fn new(account_id: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            account_name: account_name.into(),
            balance: None,
            tanks: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Looks up a tank by its installed product id.
    pub fn tank(&self, installed_product_id: &str) -> Option<&TankSnapshot> {
        self.tanks
            .iter()
            .find(|t| t.installed_product_id == installed_product_id)
    }

    /// Returns the installed product ids in tank order.
    pub fn tank_ids(&self) -> Vec<&str> {
        self.tanks
            .iter()
            .map(|t| t.installed_product_id.as_str())
            .collect()
    }
}

// ============================================================================
// Tank Snapshot
// ============================================================================

/// A single installed propane tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    /// Stable identity key across refresh cycles.
    pub installed_product_id: String,
    /// Site (delivery address) identifier.
    pub site_id: String,
    /// Site display name.
    pub site_name: String,
    /// Product description, e.g. "500 Gal Propane Tank".
    pub product_description: String,
    /// Provider product identifier.
    pub product_id: Option<String>,
    /// Tank capacity in gallons.
    pub full_capacity: Option<f64>,
    /// Gallons in the tank right after the last fill.
    pub fill_capacity: Option<f64>,
    /// Estimated fill level in percent. Not clamped: the provider may
    /// report values outside 0-100.
    pub current_percent: Option<f64>,
    /// When the level estimate was taken.
    pub reading_timestamp: Option<DateTime<Utc>>,
    /// Most recent delivery, when enrichment succeeded.
    pub last_delivery: Option<OrderDetail>,
}

impl TankSnapshot {
    /// Creates a tank with only its identity fields set.
    pub fn new(
        installed_product_id: impl Into<String>,
        site_id: impl Into<String>,
        site_name: impl Into<String>,
        product_description: impl Into<String>,
    ) -> Self {
        Self {
            installed_product_id: installed_product_id.into(),
            site_id: site_id.into(),
            site_name: site_name.into(),
            product_description: product_description.into(),
            product_id: None,
            full_capacity: None,
            fill_capacity: None,
            current_percent: None,
            reading_timestamp: None,
            last_delivery: None,
        }
    }

    /// Returns a copy of this tank with the given delivery attached.
    #[must_use]
    pub fn with_last_delivery(self, last_delivery: Option<OrderDetail>) -> Self {
        Self {
            last_delivery,
            ..self
        }
    }

    /// Price per gallon of the last delivery, if known.
    pub fn last_price_per_gallon(&self) -> Option<f64> {
        self.last_delivery
            .as_ref()
            .and_then(|d| d.propane_price_per_gallon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(id: &str) -> TankSnapshot {
        TankSnapshot::new(id, "S1", "Home", "Propane Tank")
    }

    #[test]
    fn test_tank_lookup_by_id() {
        let mut snapshot = AccountSnapshot::new("A1", "Account");
        snapshot.tanks = vec![tank("IP1"), tank("IP2")];

        assert_eq!(snapshot.tank("IP2").unwrap().installed_product_id, "IP2");
        assert!(snapshot.tank("IP3").is_none());
        assert_eq!(snapshot.tank_ids(), vec!["IP1", "IP2"]);
    }

    #[test]
    fn test_with_last_delivery() {
        let mut order = OrderDetail::new("O1");
        order.propane_price_per_gallon = Some(2.5);

        let t = tank("IP1").with_last_delivery(Some(order));
        assert_eq!(t.last_price_per_gallon(), Some(2.5));

        let t = t.with_last_delivery(None);
        assert_eq!(t.last_price_per_gallon(), None);
    }
}
