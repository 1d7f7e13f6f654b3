//! Key normalization for auxiliary sources.
//!
//! Normalization is a filter, not a validator: entries without a value and
//! keys that are not legal under the extra-key policy are dropped silently.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::settings::config::ExtraPolicy;
use crate::settings::providers::SourceMap;

/// Normalizes raw source mappings against the legal field aliases.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{ExtraPolicy, KeyNormalizer, SourceMap};
///
/// let normalizer = KeyNormalizer::new(["timeout"], false, ExtraPolicy::Forbid, "");
///
/// let mut raw = SourceMap::new();
/// raw.insert("TIMEOUT".to_string(), Some("30".to_string()));
/// raw.insert("UNRELATED".to_string(), Some("x".to_string()));
///
/// let normalized = normalizer.normalize(raw);
/// assert_eq!(normalized.len(), 1);
/// assert_eq!(normalized["timeout"], "30");
/// ```
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    legal: HashSet<String>,
    case_sensitive: bool,
    extra: ExtraPolicy,
    prefix: String,
}

impl KeyNormalizer {
    /// Build a normalizer.
    ///
    /// When `case_sensitive` is false, aliases and prefix are case-folded so
    /// that comparisons happen on lower-cased keys.
    pub fn new<I, S>(aliases: I, case_sensitive: bool, extra: ExtraPolicy, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fold = |s: &str| {
            if case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };

        Self {
            legal: aliases.into_iter().map(|a| fold(a.as_ref())).collect(),
            case_sensitive,
            extra,
            prefix: fold(prefix),
        }
    }

    /// Normalize one source mapping.
    ///
    /// Surviving entries keep their input order.
    #[must_use]
    pub fn normalize(&self, raw: SourceMap) -> Map<String, Value> {
        let mut result = Map::new();
        for (name, value) in raw {
            let Some(value) = value else {
                continue;
            };

            let key = if self.case_sensitive {
                name
            } else {
                name.to_lowercase()
            };

            if !(self.legal.contains(&key) || self.extra.tolerates_unknown()) {
                continue;
            }

            let key = match key.strip_prefix(self.prefix.as_str()) {
                Some(stripped) if !self.prefix.is_empty() => stripped.to_string(),
                _ => key,
            };
            result.insert(key, Value::String(value));
        }
        result
    }
}
