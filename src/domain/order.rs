//! Order records as served by the order-listing API.
//!
//! Deserialization is lenient at the field level: a record with a missing
//! or unparseable `createdAt`, or missing `totalPrice` sub-fields, still
//! deserializes (the bad field degrades to `None`/zero), so one malformed
//! record never sinks a whole page.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{DashboardError, Result};

/// Lifecycle states as reported by the order back office.
///
/// Display-only: the aggregator never filters on status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Complete,
    Cancelled,
}

/// Per-order revenue carried independently in both storefront currencies.
///
/// VND and JPY have no subunits, so whole integers are exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    #[serde(default, deserialize_with = "de_amount")]
    pub vi: i64,
    #[serde(default, deserialize_with = "de_amount")]
    pub ja: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub code: String,
    /// Event time used for bucketing. `None` when the upstream value is
    /// missing or unparseable; such records are excluded from every range.
    #[serde(default, deserialize_with = "de_created_at")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_price: OrderTotals,
    #[serde(default)]
    pub order_status: OrderStatus,
}

/// Validation boundary for the order-listing response.
///
/// Accepts either a bare JSON array or the `{ "data": [...] }` envelope.
/// Individual records that fail to deserialize are skipped with a warning;
/// only a structurally non-array payload is an error.
pub fn parse_orders(body: &Value) -> Result<Vec<OrderRecord>> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => {
                return Err(DashboardError::InvalidResponse(
                    "expected an order array under `data`".into(),
                ))
            }
        },
        _ => {
            return Err(DashboardError::InvalidResponse(
                "expected a JSON array of orders".into(),
            ))
        }
    };

    let mut orders = Vec::with_capacity(items.len());
    for item in items {
        match OrderRecord::deserialize(item) {
            Ok(order) => orders.push(order),
            Err(e) => tracing::warn!(error = %e, "Skipping malformed order record"),
        }
    }
    Ok(orders)
}

/// Timestamps are interpreted as naive wall-clock time. Offset-bearing
/// RFC 3339 strings keep the wall clock they were written with.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

fn de_created_at<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error> {
    let raw: Option<Value> = Option::deserialize(de)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_timestamp))
}

// Upstream sometimes serializes whole amounts as floats; round rather
// than reject.
fn de_amount<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<i64, D::Error> {
    let raw: Option<Value> = Option::deserialize(de)?;
    Ok(match raw {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let orders = parse_orders(&json!([{
            "code": "ORD-001",
            "createdAt": "2024-03-15T10:30:00",
            "totalPrice": { "vi": 250000, "ja": 0 },
            "orderStatus": "CONFIRMED"
        }]))
        .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].code, "ORD-001");
        assert_eq!(orders[0].total_price.vi, 250000);
        assert_eq!(orders[0].order_status, OrderStatus::Confirmed);
        assert!(orders[0].created_at.is_some());
    }

    #[test]
    fn test_bad_created_at_degrades_to_none() {
        let orders = parse_orders(&json!([
            { "code": "A", "createdAt": "not-a-date", "totalPrice": { "vi": 1, "ja": 0 } },
            { "code": "B", "totalPrice": { "vi": 2, "ja": 0 } }
        ]))
        .unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders[0].created_at.is_none());
        assert!(orders[1].created_at.is_none());
    }

    #[test]
    fn test_missing_total_price_defaults_to_zero() {
        let orders = parse_orders(&json!([{ "code": "A", "createdAt": "2024-03-15T10:00:00" }])).unwrap();
        assert_eq!(orders[0].total_price, OrderTotals { vi: 0, ja: 0 });
    }

    #[test]
    fn test_float_amounts_round() {
        let orders =
            parse_orders(&json!([{ "code": "A", "totalPrice": { "vi": 1000.0, "ja": 2499.6 } }]))
                .unwrap();
        assert_eq!(orders[0].total_price.vi, 1000);
        assert_eq!(orders[0].total_price.ja, 2500);
    }

    #[test]
    fn test_data_envelope_and_malformed_record_skipped() {
        let orders = parse_orders(&json!({ "data": [
            { "code": "A" },
            { "totalPrice": { "vi": 9 } },
            { "code": "C" }
        ]}))
        .unwrap();
        let codes: Vec<&str> = orders.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, ["A", "C"]);
    }

    #[test]
    fn test_non_array_payload_is_an_error() {
        assert!(parse_orders(&json!("nope")).is_err());
        assert!(parse_orders(&json!({ "data": 7 })).is_err());
    }

    #[test]
    fn test_rfc3339_offset_keeps_wall_clock() {
        let dt = parse_timestamp("2024-03-15T23:59:59+07:00").unwrap();
        assert_eq!(dt.to_string(), "2024-03-15 23:59:59");
    }
}
