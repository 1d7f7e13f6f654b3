//! Precedence merging of source mappings.
//!
//! Mappings are merged from lowest to highest precedence. Nested mappings
//! merge recursively so that a partial override only replaces the keys it
//! names; every other value is replaced outright.

use serde_json::{Map, Value};

/// Merges value mappings according to precedence rules.
///
/// # Examples
///
/// ```
/// use envsettings::settings::SettingsMerger;
/// use serde_json::json;
///
/// let base = json!({"db": {"host": "localhost", "port": "5432"}});
/// let overrides = json!({"db": {"port": "6543"}});
///
/// let merged = SettingsMerger::deep_update(
///     base.as_object().unwrap(),
///     overrides.as_object().unwrap(),
/// );
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({"db": {"host": "localhost", "port": "6543"}})
/// );
/// ```
pub struct SettingsMerger;

impl SettingsMerger {
    /// Merge three mappings, `high` over `mid` over `low`.
    ///
    /// Equivalent to `deep_update(&deep_update(low, mid), high)`.
    #[must_use]
    pub fn merge(
        low: &Map<String, Value>,
        mid: &Map<String, Value>,
        high: &Map<String, Value>,
    ) -> Map<String, Value> {
        let mut result = low.clone();
        Self::merge_into(&mut result, mid);
        Self::merge_into(&mut result, high);
        result
    }

    /// Return a new mapping with `overrides` deep-merged over `base`.
    ///
    /// Neither input is modified.
    #[must_use]
    pub fn deep_update(
        base: &Map<String, Value>,
        overrides: &Map<String, Value>,
    ) -> Map<String, Value> {
        let mut result = base.clone();
        Self::merge_into(&mut result, overrides);
        result
    }

    /// Merge `source` into `target` in place (source wins).
    ///
    /// # Merging Rules
    ///
    /// - Both values are mappings: merged recursively
    /// - Otherwise: source replaces target, including when only one side
    ///   is a mapping
    /// - Keys only in target are untouched; keys only in source are added
    pub fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
        for (key, value) in source {
            match (target.get_mut(key), value) {
                (Some(Value::Object(target_map)), Value::Object(source_map)) => {
                    Self::merge_into(target_map, source_map);
                }
                _ => {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }
}
