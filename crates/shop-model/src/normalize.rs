//! Response normalization
//!
//! Backends return one of three shapes for a collection:
//! - wrapped: `{ "products": [ ... ] }`
//! - bare array: `[ ... ]`
//! - legacy keyed map: `{ "0": { ... }, "1": { ... } }`
//!
//! Anything else normalizes to an empty collection. Individual entries that
//! fail [`CatalogRecord::from_raw`] are dropped without affecting the rest.

use crate::record::{CatalogRecord, Resource};
use serde_json::Value;

/// Normalize a collection payload into canonical records
#[must_use]
pub fn normalize<R: CatalogRecord>(raw: &Value) -> Vec<R> {
    let entries = raw_entries(raw, R::RESOURCE);
    let seen = entries.len();
    let records: Vec<R> = entries
        .into_iter()
        .filter_map(Value::as_object)
        .filter_map(R::from_raw)
        .collect();

    if records.len() < seen {
        tracing::debug!(
            resource = %R::RESOURCE,
            skipped = seen - records.len(),
            "Skipped malformed entries"
        );
    }
    records
}

/// Raw entry objects of a collection payload, in payload order
///
/// Non-object entries are dropped. Legacy keyed maps are ordered by numeric
/// key.
#[must_use]
pub fn raw_entries(raw: &Value, resource: Resource) -> Vec<&Value> {
    let entries: Vec<&Value> = match raw {
        Value::Array(entries) => entries.iter().collect(),
        Value::Object(map) => match map.get(resource.key()) {
            Some(Value::Array(entries)) => entries.iter().collect(),
            _ => {
                let mut keyed: Vec<(&String, &Value)> =
                    map.iter().filter(|(key, _)| key.as_str() != "id").collect();
                keyed.sort_by(|(a, _), (b, _)| legacy_key_order(a).cmp(&legacy_key_order(b)));
                keyed.into_iter().map(|(_, value)| value).collect()
            }
        },
        _ => Vec::new(),
    };
    entries.into_iter().filter(|e| e.is_object()).collect()
}

/// Normalize a single-record payload
///
/// Single-record endpoints return a bare object; collection shapes are
/// accepted too and yield their first record.
#[must_use]
pub fn normalize_one<R: CatalogRecord>(raw: &Value) -> Option<R> {
    raw.as_object()
        .and_then(R::from_raw)
        .or_else(|| normalize::<R>(raw).into_iter().next())
}

/// Integer keys first in numeric order, then the rest lexically
fn legacy_key_order(key: &str) -> (u8, u64, &str) {
    match key.parse::<u64>() {
        Ok(n) => (0, n, ""),
        Err(_) => (1, 0, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use crate::record::{Order, Product};
    use serde_json::json;

    fn ids<R: CatalogRecord>(records: &[R]) -> Vec<RecordId> {
        records.iter().map(|r| r.id().clone()).collect()
    }

    #[test]
    fn wrapped_array_shape() {
        let raw = json!({"products": [
            {"id": 1, "name": "A", "price": 10},
            {"id": 2, "name": "B", "price": 20}
        ]});
        let products = normalize::<Product>(&raw);
        assert_eq!(ids(&products), vec![RecordId::Numeric(1), RecordId::Numeric(2)]);
    }

    #[test]
    fn bare_array_shape() {
        let raw = json!([{"id": 7, "name": "A", "price": 1}, "junk", 4]);
        let products = normalize::<Product>(&raw);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].category, "Uncategorized");
    }

    #[test]
    fn legacy_map_shape_in_numeric_key_order() {
        let raw = json!({
            "10": {"id": 11, "name": "K", "price": 1},
            "2": {"id": 3, "name": "C", "price": 1},
            "id": {"id": 99, "name": "ignored", "price": 1},
            "0": {"id": 1, "name": "A", "price": 1},
            "meta": "not an object"
        });
        let products = normalize::<Product>(&raw);
        assert_eq!(
            ids(&products),
            vec![RecordId::Numeric(1), RecordId::Numeric(3), RecordId::Numeric(11)]
        );
    }

    #[test]
    fn malformed_entry_is_skipped_not_the_batch() {
        let raw = json!([
            {"id": 1, "name": "ok", "price": 5},
            {"id": 2, "price": 5},
            {"id": 3, "name": "ok too", "price": 6}
        ]);
        assert_eq!(normalize::<Product>(&raw).len(), 2);
    }

    #[test]
    fn unrecognized_shapes_are_empty() {
        for raw in [json!(null), json!(42), json!("text"), json!({}), json!({"products": 3})] {
            assert!(normalize::<Product>(&raw).is_empty(), "{raw}");
        }
    }

    #[test]
    fn wrapper_key_follows_record_type() {
        let raw = json!({"orders": [{"id": "ORD-00001", "status": "success", "total": 5}]});
        assert_eq!(normalize::<Order>(&raw).len(), 1);
        assert!(normalize::<Product>(&raw).is_empty());
    }

    #[test]
    fn raw_entries_drop_non_objects() {
        let raw = json!({"orders": [{"id": 1}, 2, null, {"id": 3}]});
        assert_eq!(raw_entries(&raw, Resource::Orders).len(), 2);
        assert!(raw_entries(&json!("x"), Resource::Orders).is_empty());
    }

    #[test]
    fn single_record_payloads() {
        let one = json!({"id": 81, "name": "Fan", "price": 990});
        assert_eq!(normalize_one::<Product>(&one).unwrap().id, RecordId::Numeric(81));

        let wrapped = json!({"products": [{"id": 5, "name": "x", "price": 1}]});
        assert_eq!(normalize_one::<Product>(&wrapped).unwrap().id, RecordId::Numeric(5));

        assert!(normalize_one::<Product>(&json!({"id": 81})).is_none());
    }
}
