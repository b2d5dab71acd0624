//! Ferrellgas provider implementation.
//!
//! Polls the Ferrellgas customer portal backend for one account:
//!
//! 1. `POST /api/Auth/Login/` - exchange credentials for a bearer token
//! 2. `GET /api/AccountSummary/{accountId}` - balance, sites and tanks
//! 3. `GET /api/Order/IP/{installedProductId}` - order history per tank
//! 4. `GET /api/Order/{orderId}` - detail of the latest delivery
//!
//! `GET /api/User/me` lists the account ids for setup.
//!
//! ## Example
//!
//! ```ignore
//! use tankgauge_providers::ferrellgas::FerrellgasPipeline;
//!
//! let pipeline = FerrellgasPipeline::new(&ctx);
//! let snapshot = pipeline.fetch_snapshot(&credentials, "123456").await?;
//! ```

// Modules
mod api;
mod credentials;
mod enricher;
mod error;
pub(crate) mod orders;
pub(crate) mod parser;
mod pipeline;

// Re-exports
pub use api::{DEFAULT_BASE_URL, FerrellgasApiClient};
pub use credentials::{FerrellgasCredentialStore, PASSWORD_ENV, USERNAME_ENV};
pub use enricher::{enrich_tanks, find_last_delivery};
pub use error::FerrellgasError;
pub use orders::{DELIVERY_ORDER_TYPES, is_delivery, parse_order_detail, select_last_delivery};
pub use parser::{
    DEFAULT_PRODUCT_DESCRIPTION, as_list, as_number, as_text, as_timestamp,
    parse_account_summary, parse_timestamp,
};
pub use pipeline::FerrellgasPipeline;
