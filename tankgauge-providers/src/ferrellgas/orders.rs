//! Delivery selection and order detail parsing.

use std::cmp::Ordering;

use serde_json::{Map, Value};
use tankgauge_core::{OrderDetail, OrderLine, product_codes};
use tracing::debug;

use super::parser::{as_list, as_number, as_text, as_timestamp};

/// Order type codes that mark a delivery.
pub const DELIVERY_ORDER_TYPES: &[&str] = &["DEL", "DELIVERY"];

// ============================================================================
// Delivery Selection
// ============================================================================

/// Returns true if the summary entry's `OrderType` is a delivery code.
pub fn is_delivery(entry: &Map<String, Value>) -> bool {
    entry
        .get("OrderType")
        .and_then(Value::as_str)
        .is_some_and(|code| {
            let code = code.trim();
            DELIVERY_ORDER_TYPES
                .iter()
                .any(|d| d.eq_ignore_ascii_case(code))
        })
}

/// Sort key: `CompleteDate`, else `CreateDate`, as raw strings.
fn recency_key(entry: &Map<String, Value>) -> Option<&str> {
    ["CompleteDate", "CreateDate"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))
}

/// Picks the most recent delivery from an order summary list.
///
/// Deliveries are preferred; when no entry carries a delivery code every
/// entry is a candidate. Candidates are ordered by their date string,
/// compared lexicographically, newest first. Entries without a date sort
/// last.
pub fn select_last_delivery(entries: &[Map<String, Value>]) -> Option<&Map<String, Value>> {
    let mut candidates: Vec<&Map<String, Value>> =
        entries.iter().filter(|e| is_delivery(e)).collect();

    if candidates.is_empty() {
        debug!(
            entries = entries.len(),
            "No delivery-typed orders, considering all"
        );
        candidates = entries.iter().collect();
    }

    candidates.sort_by(|a, b| match (recency_key(a), recency_key(b)) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    candidates.into_iter().next()
}

// ============================================================================
// Order Detail
// ============================================================================

/// Builds an [`OrderDetail`] from the detail payload, using the summary
/// entry for fields the detail omits.
pub fn parse_order_detail(detail: &Map<String, Value>, summary: &Map<String, Value>) -> OrderDetail {
    let order_id = as_text(detail.get("OrderId"))
        .or_else(|| as_text(summary.get("OrderId")))
        .unwrap_or_default();

    let mut order = OrderDetail::new(order_id);
    order.order_date =
        as_timestamp(detail.get("OrderDate")).or_else(|| as_timestamp(summary.get("OrderDate")));
    order.complete_date = as_timestamp(detail.get("CompleteDate"))
        .or_else(|| as_timestamp(summary.get("CompleteDate")));
    order.status = as_text(detail.get("Status"))
        .or_else(|| as_text(summary.get("Status")))
        .unwrap_or_default();
    order.service_description = as_text(detail.get("ServiceDescription")).unwrap_or_default();
    order.grand_total = as_number(detail.get("GrandTotal")).unwrap_or(0.0);
    order.total_tax = as_number(detail.get("TotalTax")).unwrap_or(0.0);

    for raw in as_list(detail.get("Lines")).map_or(&[][..], Vec::as_slice) {
        let Value::Object(raw) = raw else {
            debug!(order_id = %order.order_id, "Skipping non-object order line");
            continue;
        };

        let line = parse_order_line(raw);
        match line.product.trim().to_ascii_uppercase().as_str() {
            product_codes::PROPANE => {
                order.propane_gallons = line.quantity;
                order.propane_price_per_gallon = line.unit_price;
                order.propane_subtotal = line.total_price;
            }
            product_codes::FUEL_SURCHARGE => order.fuel_surcharge = line.total_price,
            product_codes::HAZMAT_FEE => order.hazmat_fee = line.total_price,
            _ => {}
        }
        order.lines.push(line);
    }

    order
}

fn parse_order_line(raw: &Map<String, Value>) -> OrderLine {
    let mut line = OrderLine::new(as_text(raw.get("Product")).unwrap_or_default());
    line.quantity = as_number(raw.get("Quantity"));
    line.unit_of_measure = as_text(raw.get("UnitOfMeasure"));
    line.unit_price = as_number(raw.get("UnitPrice"));
    line.total_price = as_number(raw.get("TotalPrice"));
    line
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn entries(value: Value) -> Vec<Map<String, Value>> {
        match value {
            Value::Array(items) => items.into_iter().map(as_map).collect(),
            _ => panic!("not an array"),
        }
    }

    #[test]
    fn test_is_delivery_normalizes_code() {
        assert!(is_delivery(&as_map(json!({"OrderType": "DEL"}))));
        assert!(is_delivery(&as_map(json!({"OrderType": " delivery "}))));
        assert!(!is_delivery(&as_map(json!({"OrderType": "SVC"}))));
        assert!(!is_delivery(&as_map(json!({}))));
    }

    #[test]
    fn test_selects_latest_delivery() {
        let list = entries(json!([
            {"OrderId": "1", "OrderType": "DEL", "CompleteDate": "2024-01-05"},
            {"OrderId": "2", "OrderType": "SVC", "CompleteDate": "2024-03-01"},
            {"OrderId": "3", "OrderType": "DEL", "CompleteDate": "2024-02-10"},
            {"OrderId": "4", "OrderType": "DEL", "CreateDate": "2024-01-20"}
        ]));

        let selected = select_last_delivery(&list).unwrap();
        assert_eq!(selected["OrderId"], "3");
    }

    #[test]
    fn test_falls_back_to_all_entries_without_type() {
        let list = entries(json!([
            {"OrderId": "1", "CompleteDate": "2024-01-05"},
            {"OrderId": "2", "CompleteDate": "2024-03-01"}
        ]));

        assert_eq!(select_last_delivery(&list).unwrap()["OrderId"], "2");
    }

    #[test]
    fn test_sort_is_lexicographic() {
        // "9/1/2023" > "10/1/2023" as strings even though it is earlier.
        let list = entries(json!([
            {"OrderId": "oct", "CompleteDate": "10/1/2023"},
            {"OrderId": "sep", "CompleteDate": "9/1/2023"}
        ]));

        assert_eq!(select_last_delivery(&list).unwrap()["OrderId"], "sep");
    }

    #[test]
    fn test_undated_entries_sort_last() {
        let list = entries(json!([
            {"OrderId": "undated"},
            {"OrderId": "dated", "CreateDate": "2020-01-01"}
        ]));

        assert_eq!(select_last_delivery(&list).unwrap()["OrderId"], "dated");
    }

    #[test]
    fn test_empty_list() {
        assert!(select_last_delivery(&[]).is_none());
    }

    #[test]
    fn test_parse_order_detail() {
        let summary = as_map(json!({"OrderId": "O1", "Status": "Closed"}));
        let detail = as_map(json!({
            "OrderId": "O1",
            "OrderDate": "2024-01-10",
            "CompleteDate": "2024-01-12T15:30:00Z",
            "Status": "Complete",
            "ServiceDescription": "Propane Delivery",
            "GrandTotal": 612.34,
            "TotalTax": 12.1,
            "Lines": [
                {"Product": "PROPANE", "Quantity": 230.5, "UnitOfMeasure": "GAL", "UnitPrice": 2.4999, "TotalPrice": 576.23},
                {"Product": " fuel_surcharge ", "Quantity": 1, "TotalPrice": 9.99},
                {"Product": "HAZMAT_FEE", "TotalPrice": 4.95},
                {"Product": "TANK_RENTAL", "TotalPrice": 50},
                "junk"
            ]
        }));

        let order = parse_order_detail(&detail, &summary);
        assert_eq!(order.order_id, "O1");
        assert_eq!(
            order.order_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(
            order.complete_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 12, 15, 30, 0).unwrap())
        );
        assert_eq!(order.status, "Complete");
        assert_eq!(order.service_description, "Propane Delivery");
        assert_eq!(order.grand_total, 612.34);
        assert_eq!(order.total_tax, 12.1);
        assert_eq!(order.propane_gallons, Some(230.5));
        assert_eq!(order.propane_price_per_gallon, Some(2.4999));
        assert_eq!(order.propane_subtotal, Some(576.23));
        assert_eq!(order.fuel_surcharge, Some(9.99));
        assert_eq!(order.hazmat_fee, Some(4.95));
        assert_eq!(order.lines.len(), 4);
        assert_eq!(order.lines[0].unit_of_measure.as_deref(), Some("GAL"));
        assert_eq!(order.lines[3].product, "TANK_RENTAL");
    }

    #[test]
    fn test_order_detail_fallbacks() {
        let summary = as_map(json!({
            "OrderId": "O7",
            "Status": "Closed",
            "CompleteDate": "2024-05-01"
        }));
        let detail = as_map(json!({"GrandTotal": "n/a", "Lines": {"Product": "PROPANE"}}));

        let order = parse_order_detail(&detail, &summary);
        assert_eq!(order.order_id, "O7");
        assert_eq!(order.status, "Closed");
        assert_eq!(
            order.complete_date,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(order.grand_total, 0.0);
        assert_eq!(order.total_tax, 0.0);
        assert!(order.lines.is_empty());
        assert!(order.propane_gallons.is_none());
    }

    #[test]
    fn test_order_detail_status_defaults_empty() {
        let order = parse_order_detail(&Map::new(), &as_map(json!({"OrderId": "O1"})));
        assert_eq!(order.status, "");
        assert_eq!(order.service_description, "");
    }
}
