//! Property-based tests for settings resolution.

use super::config::ExtraPolicy;
use super::merger::SettingsMerger;
use super::normalizer::KeyNormalizer;
use super::providers::SourceMap;
use proptest::prelude::*;
use serde_json::{Map, Value};

// Strategy for generating nested value mappings with a small key space so
// that inputs overlap often.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        "[a-z0-9]{0,6}".prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
        prop::collection::vec("[a-z]{1,3}", 0..3).prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-d]", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    })
}

fn map_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-d]", value_strategy(), 0..5)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Three-way merge is two pairwise updates in application order
    #[test]
    fn merge_is_pairwise_update_in_order(
        low in map_strategy(),
        mid in map_strategy(),
        high in map_strategy()
    ) {
        let merged = SettingsMerger::merge(&low, &mid, &high);
        let stepwise = SettingsMerger::deep_update(&SettingsMerger::deep_update(&low, &mid), &high);
        prop_assert_eq!(merged, stepwise);
    }

    // Updating a mapping with itself is the identity
    #[test]
    fn deep_update_idempotent(map in map_strategy()) {
        prop_assert_eq!(SettingsMerger::deep_update(&map, &map), map);
    }

    // Keys unique to either side survive the merge
    #[test]
    fn deep_update_keeps_all_keys(base in map_strategy(), overrides in map_strategy()) {
        let merged = SettingsMerger::deep_update(&base, &overrides);
        for key in base.keys().chain(overrides.keys()) {
            prop_assert!(merged.contains_key(key), "missing key {}", key);
        }
        prop_assert!(merged.keys().all(|k| base.contains_key(k) || overrides.contains_key(k)));
    }

    // A non-mapping override replaces the base value entirely
    #[test]
    fn non_mapping_override_replaces(base in map_strategy(), overrides in map_strategy()) {
        let merged = SettingsMerger::deep_update(&base, &overrides);
        for (key, value) in &overrides {
            let both_maps = value.is_object() && base.get(key).is_some_and(Value::is_object);
            if !both_maps {
                prop_assert_eq!(&merged[key], value);
            }
        }
    }

    // Case-insensitive normalization only ever emits lower-cased keys
    #[test]
    fn insensitive_normalization_lowercases(
        raw in prop::collection::vec(("[A-Za-z_]{1,8}", prop::option::of("[a-z]{0,4}")), 0..8)
    ) {
        let source: SourceMap = raw.into_iter().collect();
        let normalizer = KeyNormalizer::new(Vec::<String>::new(), false, ExtraPolicy::Allow, "");
        let normalized = normalizer.normalize(source);
        for key in normalized.keys() {
            prop_assert_eq!(key.clone(), key.to_lowercase());
        }
    }

    // With a forbidding policy every surviving key is a legal alias
    #[test]
    fn forbid_keeps_only_legal_keys(
        raw in prop::collection::vec(("[a-f]{1,2}", prop::option::of("[a-z]{0,4}")), 0..10)
    ) {
        let legal = ["a", "b", "cd"];
        let source: SourceMap = raw.into_iter().collect();
        let present: usize = source
            .iter()
            .filter(|(k, v)| v.is_some() && legal.contains(&k.as_str()))
            .count();

        let normalizer = KeyNormalizer::new(legal, true, ExtraPolicy::Forbid, "");
        let normalized = normalizer.normalize(source);

        prop_assert_eq!(normalized.len(), present);
        prop_assert!(normalized.keys().all(|k| legal.contains(&k.as_str())));
    }
}
