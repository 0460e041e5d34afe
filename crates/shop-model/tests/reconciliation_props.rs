//! Property tests for normalization, merging and mutability.

use proptest::prelude::*;
use serde_json::{json, Value};
use shop_model::{is_editable, merge, normalize, source_of, CatalogRecord, Origin, Product, RecordId};
use std::collections::HashSet;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z0-9]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn products(ids: &[i64], tag: &str) -> Vec<Product> {
    ids.iter()
        .map(|id| Product::new(*id, format!("{tag}-{id}"), 1.0))
        .collect()
}

proptest! {
    #[test]
    fn prop_normalize_never_panics_and_fills_defaults(raw in arb_json()) {
        for product in normalize::<Product>(&raw) {
            prop_assert!(!product.name.is_empty());
            prop_assert!(!product.image.is_empty());
            prop_assert!(!product.category.is_empty());
            prop_assert!(!product.currency.is_empty());
        }
    }

    #[test]
    fn prop_every_shape_yields_same_records(ids in prop::collection::btree_set(0i64..500, 0..20)) {
        let entries: Vec<Value> = ids
            .iter()
            .map(|id| json!({"id": id, "name": format!("p{id}"), "price": 1}))
            .collect();
        let legacy: serde_json::Map<String, Value> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i.to_string(), e.clone()))
            .collect();

        let wrapped = normalize::<Product>(&json!({"products": entries.clone()}));
        let bare = normalize::<Product>(&Value::Array(entries));
        let keyed = normalize::<Product>(&Value::Object(legacy));

        prop_assert_eq!(wrapped.len(), ids.len());
        prop_assert_eq!(&wrapped, &bare);
        prop_assert_eq!(&wrapped, &keyed);
    }

    #[test]
    fn prop_editable_iff_at_least_80(x in any::<i64>()) {
        prop_assert_eq!(is_editable(&RecordId::Numeric(x)), x >= 80);
        if let Ok(seq) = u32::try_from(x) {
            prop_assert_eq!(is_editable(&RecordId::seed_order(seq)), x >= 80);
        }
    }

    #[test]
    fn prop_source_of_agrees_with_is_editable(x in any::<i64>(), text in "[A-Z]{0,3}-?[0-9A-Z]{1,6}") {
        for id in [RecordId::Numeric(x), RecordId::Text(text.clone())] {
            prop_assert_eq!(is_editable(&id), source_of(&id) == Origin::Live);
        }
    }

    #[test]
    fn prop_merge_size_and_precedence(
        a in prop::collection::btree_set(0i64..200, 0..40),
        b in prop::collection::btree_set(0i64..200, 0..40),
    ) {
        let a: Vec<i64> = a.into_iter().collect();
        let b: Vec<i64> = b.into_iter().collect();
        let overlap = a.iter().filter(|id| b.contains(id)).count();

        let merged = merge(products(&a, "a"), products(&b, "b"));
        prop_assert_eq!(merged.len(), a.len() + b.len() - overlap);

        let unique: HashSet<_> = merged.iter().map(|p| p.id().clone()).collect();
        prop_assert_eq!(unique.len(), merged.len());

        for product in &merged {
            if let RecordId::Numeric(id) = product.id {
                let expected = if a.contains(&id) { "a" } else { "b" };
                prop_assert!(product.name.starts_with(expected));
            }
        }
    }
}

#[test]
fn colliding_seed_and_live_id_keeps_first_source() {
    let seed = normalize::<Product>(&json!({"products": [{"id": 5, "name": "Seed kettle", "price": 590}]}));
    let live = normalize::<Product>(&json!([{"id": "5", "name": "Live kettle", "price": 650}]));

    let merged = merge(seed, live);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, "Seed kettle");
    assert_eq!(merged[0].price, 590.0);
}
