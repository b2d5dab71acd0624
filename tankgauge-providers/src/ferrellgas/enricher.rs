//! Per-tank delivery enrichment.
//!
//! Each tank's last delivery is fetched independently. A failure for one
//! tank is logged and leaves that tank's `last_delivery` empty; it never
//! affects the other tanks or the snapshot as a whole.

use futures::future::join_all;
use tankgauge_core::{OrderDetail, TankSnapshot};
use tracing::{debug, instrument, warn};

use super::api::FerrellgasApiClient;
use super::error::FerrellgasError;
use super::orders::{parse_order_detail, select_last_delivery};
use super::parser::as_text;

/// Finds and parses the most recent delivery for one installed product.
#[instrument(skip(client, token))]
pub async fn find_last_delivery(
    client: &FerrellgasApiClient,
    token: &str,
    installed_product_id: &str,
) -> Result<Option<OrderDetail>, FerrellgasError> {
    let entries = client.order_list(token, installed_product_id).await?;

    let Some(entry) = select_last_delivery(&entries) else {
        debug!("No orders for tank");
        return Ok(None);
    };

    let Some(order_id) = as_text(entry.get("OrderId")) else {
        debug!("Latest order has no OrderId");
        return Ok(None);
    };

    let detail = client.order_detail(token, &order_id).await?;
    Ok(Some(parse_order_detail(&detail, entry)))
}

/// Attaches the last delivery to every tank, concurrently. Tank order is
/// preserved.
pub async fn enrich_tanks(
    client: &FerrellgasApiClient,
    token: &str,
    tanks: Vec<TankSnapshot>,
) -> Vec<TankSnapshot> {
    join_all(tanks.into_iter().map(|tank| async move {
        match find_last_delivery(client, token, &tank.installed_product_id).await {
            Ok(delivery) => tank.with_last_delivery(delivery),
            Err(e) => {
                warn!(
                    installed_product_id = %tank.installed_product_id,
                    error = %e,
                    "Failed to fetch last delivery"
                );
                tank
            }
        }
    }))
    .await
}
