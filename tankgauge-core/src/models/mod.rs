//! Domain models for `TankGauge`.
//!
//! Snapshots are immutable once built and replaced wholesale every refresh
//! cycle. Consumers re-resolve tanks by `installed_product_id` each cycle.
//!
//! ## Submodules
//!
//! - [`account`] - Account and tank snapshots
//! - [`order`] - Delivery orders and their line items

mod account;
mod order;

pub use account::{AccountSnapshot, TankSnapshot};
pub use order::{OrderDetail, OrderLine, product_codes};
