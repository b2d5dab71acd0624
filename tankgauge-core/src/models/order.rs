//! Delivery order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product codes the provider uses on order line items.
pub mod product_codes {
    /// Propane itself.
    pub const PROPANE: &str = "PROPANE";
    /// Fuel surcharge fee.
    pub const FUEL_SURCHARGE: &str = "FUEL_SURCHARGE";
    /// Hazardous materials fee.
    pub const HAZMAT_FEE: &str = "HAZMAT_FEE";
}

/// Full detail of a single delivery order.
///
/// The propane and fee fields are only populated when a matching line item
/// exists; `grand_total` and `total_tax` are always numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    /// Provider order identifier.
    pub order_id: String,
    /// When the order was placed.
    pub order_date: Option<DateTime<Utc>>,
    /// When the delivery was completed.
    pub complete_date: Option<DateTime<Utc>>,
    /// Order status text.
    pub status: String,
    /// Service description text.
    pub service_description: String,
    /// Order total in USD.
    pub grand_total: f64,
    /// Tax portion of the total in USD.
    pub total_tax: f64,
    /// Gallons of propane delivered.
    pub propane_gallons: Option<f64>,
    /// Propane price per gallon in USD.
    pub propane_price_per_gallon: Option<f64>,
    /// Propane line subtotal in USD.
    pub propane_subtotal: Option<f64>,
    /// Fuel surcharge in USD.
    pub fuel_surcharge: Option<f64>,
    /// Hazmat fee in USD.
    pub hazmat_fee: Option<f64>,
    /// All line items, recognized or not.
    pub lines: Vec<OrderLine>,
}

impl OrderDetail {
    /// Creates an order with zero totals and no line items.
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            order_date: None,
            complete_date: None,
            status: String::new(),
            service_description: String::new(),
            grand_total: 0.0,
            total_tax: 0.0,
            propane_gallons: None,
            propane_price_per_gallon: None,
            propane_subtotal: None,
            fuel_surcharge: None,
            hazmat_fee: None,
            lines: Vec::new(),
        }
    }
}

/// One line item on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product code, e.g. `PROPANE`.
    pub product: String,
    /// Quantity in `unit_of_measure` units.
    pub quantity: Option<f64>,
    /// Unit of measure, e.g. `GAL`.
    pub unit_of_measure: Option<String>,
    /// Price per unit in USD.
    pub unit_price: Option<f64>,
    /// Line total in USD.
    pub total_price: Option<f64>,
}

impl OrderLine {
    /// Creates a line with only its product code.
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            quantity: None,
            unit_of_measure: None,
            unit_price: None,
            total_price: None,
        }
    }
}
