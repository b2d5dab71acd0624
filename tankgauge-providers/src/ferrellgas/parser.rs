//! Ferrellgas account summary parser.
//!
//! Field access goes through a small set of coercion helpers that either
//! produce a value or `None`. A malformed field never fails the parse; a
//! malformed site or tank entry is skipped.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tankgauge_core::{AccountSnapshot, TankSnapshot};
use tracing::debug;

/// Description used when a tank has none.
pub const DEFAULT_PRODUCT_DESCRIPTION: &str = "Ferrellgas Tank";

/// Datetime layouts with an explicit offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Datetime layouts without an offset. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ============================================================================
// Coercion Helpers
// ============================================================================

/// Reads an integer or floating JSON number. Strings, booleans and null are
/// rejected.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Reads a non-empty string, stringifying numbers and booleans.
pub fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a timestamp string. See [`parse_timestamp`].
pub fn as_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Reads a JSON array. Anything else is treated as absent.
pub fn as_list(value: Option<&Value>) -> Option<&Vec<Value>> {
    match value? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// JSON truthiness: null, false, zero and empty containers are false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// Parses a provider timestamp into UTC.
///
/// Accepts ISO-8601 datetimes with or without an offset (naive values are
/// taken as UTC), then falls back to a bare `YYYY-MM-DD` at midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let with_offset = expand_short_offset(raw);
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }

    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(dt.and_utc());
    }

    debug!(value = %raw, "Unable to parse timestamp");
    None
}

/// Rewrites a trailing `Z` or hour-only `±HH` offset as `±HHMM` so `%z`
/// accepts it. Values without a time part are returned unchanged.
fn expand_short_offset(raw: &str) -> Cow<'_, str> {
    if !raw.contains(':') {
        return Cow::Borrowed(raw);
    }
    if let Some(head) = raw.strip_suffix(['Z', 'z']) {
        return Cow::Owned(format!("{head}+0000"));
    }

    let split = raw.len().saturating_sub(3);
    let short_hours = raw.get(split..).is_some_and(|tail| {
        let mut chars = tail.chars();
        matches!(chars.next(), Some('+' | '-')) && chars.all(|c| c.is_ascii_digit())
    }) && raw.get(..split).is_some_and(|head| head.ends_with(|c: char| c.is_ascii_digit()));

    if short_hours {
        Cow::Owned(format!("{raw}00"))
    } else {
        Cow::Borrowed(raw)
    }
}

// ============================================================================
// Account Summary
// ============================================================================

/// Builds an [`AccountSnapshot`] from the account summary payload.
///
/// Tanks are returned without delivery data; see the enricher.
pub fn parse_account_summary(account_id: &str, payload: &Map<String, Value>) -> AccountSnapshot {
    let account_name = as_text(payload.get("Name")).unwrap_or_else(|| account_id.to_string());
    let mut snapshot = AccountSnapshot::new(account_id, account_name);

    snapshot.balance = match payload.get("FinancialSummary") {
        Some(Value::Object(summary)) => as_number(summary.get("Balance")),
        _ => None,
    };

    let sites: &[Value] = match payload.get("SiteSummary") {
        None => &[],
        Some(value) => as_list(Some(value)).map_or_else(
            || {
                debug!("SiteSummary is not a list");
                &[][..]
            },
            Vec::as_slice,
        ),
    };

    let mut seen = HashSet::new();

    for (site_index, site) in sites.iter().enumerate() {
        let Value::Object(site) = site else {
            debug!(site_index, "Skipping non-object site entry");
            continue;
        };

        for tank in parse_site(site, site_index) {
            if seen.insert(tank.installed_product_id.clone()) {
                snapshot.tanks.push(tank);
            } else {
                debug!(
                    installed_product_id = %tank.installed_product_id,
                    "Skipping duplicate tank"
                );
            }
        }
    }

    snapshot
}

fn parse_site(site: &Map<String, Value>, site_index: usize) -> Vec<TankSnapshot> {
    let site_id = as_text(site.get("SiteId")).unwrap_or_else(|| format!("site_{site_index}"));
    let site_name = as_text(site.get("SiteName"))
        .or_else(|| as_text(site.get("Address1")))
        .unwrap_or_else(|| site_id.clone());

    let Some(entries) = as_list(site.get("IPSummary")) else {
        debug!(site_id = %site_id, "IPSummary is not a list");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(tank_index, entry)| match entry {
            Value::Object(tank) => Some(parse_tank(tank, &site_id, &site_name, tank_index)),
            _ => None,
        })
        .collect()
}

fn parse_tank(
    tank: &Map<String, Value>,
    site_id: &str,
    site_name: &str,
    tank_index: usize,
) -> TankSnapshot {
    let installed_product_id = match tank.get("InstalledProductId") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => format!("{site_id}_{tank_index}"),
    };

    let description = as_text(tank.get("ProductDescription"))
        .unwrap_or_else(|| DEFAULT_PRODUCT_DESCRIPTION.to_string());

    let mut snapshot = TankSnapshot::new(installed_product_id, site_id, site_name, description);
    snapshot.product_id = as_text(tank.get("ProductId"));
    snapshot.full_capacity = as_number(tank.get("FullCapacity"));
    snapshot.fill_capacity = as_number(tank.get("FillCapacity"));
    snapshot.current_percent = as_number(tank.get("EstCurrPct"));
    snapshot.reading_timestamp = as_timestamp(tank.get("EstimatedPercentageDate"));
    snapshot
}

// ============================================================================
// Tests
// ============================================================================
