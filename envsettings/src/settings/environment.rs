//! Environment variable source.
//!
//! The process environment is read once per resolution into an
//! [`EnvSnapshot`]; fields then look up their environment names in it.

use std::env;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::settings::decoder::Decoder;
use crate::settings::field::FieldDescriptor;

/// A point-in-time copy of environment variables.
///
/// Entries keep the order in which they were read. Lookup keys may be
/// case-folded, but every entry remembers the name it was set under.
///
/// # Examples
///
/// ```
/// use envsettings::settings::EnvSnapshot;
///
/// let snapshot = EnvSnapshot::from_pairs([("PORT", "8080")]);
/// assert_eq!(snapshot.get("PORT"), Some("8080"));
///
/// let folded = snapshot.case_folded();
/// assert_eq!(folded.get("port"), Some("8080"));
/// assert_eq!(folded.lookup("port"), Some(("PORT", "8080")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: IndexMap<String, EnvEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EnvEntry {
    name: String,
    value: String,
}

impl EnvSnapshot {
    /// Read the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_pairs(
            env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Build a snapshot from explicit pairs.
    ///
    /// A repeated name keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = IndexMap::new();
        for (name, value) in pairs {
            let name = name.into();
            let entry = EnvEntry {
                name: name.clone(),
                value: value.into(),
            };
            vars.insert(name, entry);
        }
        Self { vars }
    }

    /// A copy keyed by lower-cased names.
    ///
    /// When two names fold to the same key, the one read last wins.
    #[must_use]
    pub fn case_folded(&self) -> Self {
        let mut vars = IndexMap::with_capacity(self.vars.len());
        for (key, entry) in &self.vars {
            vars.insert(key.to_lowercase(), entry.clone());
        }
        Self { vars }
    }

    /// Look up a variable's value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|entry| entry.value.as_str())
    }

    /// Look up a variable by key, returning the name it was set under and
    /// its value.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<(&str, &str)> {
        self.vars
            .get(key)
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Collect environment values for `fields`, keyed by field alias.
///
/// `snapshot` must already be case-folded when names are matched
/// case-insensitively. For each field the first of its environment names
/// present in the snapshot supplies the value; complex fields are decoded.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] for the first complex value that fails
/// to decode. The error names the variable as it was set.
pub fn build_environ(
    fields: &[FieldDescriptor],
    snapshot: &EnvSnapshot,
    decoder: &Decoder,
) -> Result<Map<String, Value>> {
    let mut values = Map::new();

    for field in fields {
        let Some((env_name, raw)) = field.env_names().iter().find_map(|name| snapshot.lookup(name))
        else {
            continue;
        };

        log::debug!("field '{}' read from {env_name}", field.name());
        let value = if field.is_complex() {
            decoder.decode_env(env_name, raw)?
        } else {
            Value::String(raw.to_string())
        };
        values.insert(field.alias().to_string(), value);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::settings::config::SettingsConfig;
    use crate::settings::field::{EnvSpec, FieldDefinition, FieldKind};
    use serde_json::json;

    fn prepare(definitions: &[FieldDefinition], config: &SettingsConfig) -> Vec<FieldDescriptor> {
        definitions
            .iter()
            .map(|d| FieldDescriptor::prepare(d, config))
            .collect()
    }

    #[test]
    fn test_first_present_name_wins() {
        let config = SettingsConfig::new().with_case_sensitive(true);
        let fields = prepare(
            &[FieldDefinition::new("port").with_env(EnvSpec::sequence(["APP_PORT", "PORT"]))],
            &config,
        );

        let snapshot = EnvSnapshot::from_pairs([("PORT", "8080")]);
        let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
        assert_eq!(values["port"], "8080");

        let snapshot = EnvSnapshot::from_pairs([("PORT", "8080"), ("APP_PORT", "9090")]);
        let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
        assert_eq!(values["port"], "9090");
    }

    #[test]
    fn test_values_keyed_by_alias() {
        let config = SettingsConfig::new();
        let fields = prepare(
            &[FieldDefinition::new("database_url")
                .with_alias("dsn")
                .with_env(EnvSpec::Name("DATABASE_URL".into()))],
            &config,
        );

        let snapshot = EnvSnapshot::from_pairs([("DATABASE_URL", "postgres://")]).case_folded();
        let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
        assert_eq!(Value::Object(values), json!({"dsn": "postgres://"}));
    }

    #[test]
    fn test_complex_field_decoded() {
        let config = SettingsConfig::new();
        let fields = prepare(
            &[FieldDefinition::new("tags").with_kind(FieldKind::Complex)],
            &config,
        );

        let snapshot = EnvSnapshot::from_pairs([("TAGS", r#"["a","b"]"#)]).case_folded();
        let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
        assert_eq!(values["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_complex_field_decode_failure() {
        let config = SettingsConfig::new().with_case_sensitive(true);
        let fields = prepare(
            &[FieldDefinition::new("tags")
                .with_kind(FieldKind::Complex)
                .with_env(EnvSpec::Name("TAGS".into()))],
            &config,
        );

        let snapshot = EnvSnapshot::from_pairs([("TAGS", "not-json")]);
        let err = build_environ(&fields, &snapshot, &Decoder::default()).unwrap_err();
        assert!(matches!(err, Error::Decode { ref env_name, .. } if env_name == "TAGS"));
    }

    #[test]
    fn test_scalar_passed_through_raw() {
        let config = SettingsConfig::new();
        let fields = prepare(
            &[FieldDefinition::new("debug").with_kind(FieldKind::Boolean)],
            &config,
        );

        let snapshot = EnvSnapshot::from_pairs([("DEBUG", "[1]")]).case_folded();
        let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
        assert_eq!(values["debug"], "[1]");
    }

    #[test]
    fn test_case_fold_collision_is_deterministic_last_wins() {
        let config = SettingsConfig::new();
        let fields = prepare(&[FieldDefinition::new("port")], &config);

        for _ in 0..200 {
            let snapshot =
                EnvSnapshot::from_pairs([("PORT", "upper"), ("port", "lower")]).case_folded();
            let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
            assert_eq!(values["port"], "lower");
        }

        let snapshot = EnvSnapshot::from_pairs([("port", "lower"), ("PORT", "upper")]).case_folded();
        assert_eq!(snapshot.get("port"), Some("upper"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_decode_failure_names_variable_as_set() {
        let config = SettingsConfig::new();
        let fields = prepare(
            &[FieldDefinition::new("tags").with_kind(FieldKind::Complex)],
            &config,
        );

        let snapshot = EnvSnapshot::from_pairs([("TAGS", "not-json")]).case_folded();
        let err = build_environ(&fields, &snapshot, &Decoder::default()).unwrap_err();
        assert!(matches!(err, Error::Decode { ref env_name, .. } if env_name == "TAGS"));
        assert!(err.to_string().contains("\"TAGS\""));
    }

    #[test]
    fn test_snapshot_keeps_insertion_order_and_names() {
        let snapshot = EnvSnapshot::from_pairs([("B", "2"), ("a", "1")]).case_folded();
        assert_eq!(snapshot.lookup("b"), Some(("B", "2")));
        assert_eq!(snapshot.lookup("a"), Some(("a", "1")));
        assert_eq!(snapshot.lookup("A"), None);
    }

    #[test]
    fn test_skip_env_field_never_read() {
        let config = SettingsConfig::new();
        let fields = prepare(&[FieldDefinition::new("internal").skip_env()], &config);
        let snapshot = EnvSnapshot::from_pairs([("internal", "x")]);
        let values = build_environ(&fields, &snapshot, &Decoder::default()).unwrap();
        assert!(values.is_empty());
    }
}
