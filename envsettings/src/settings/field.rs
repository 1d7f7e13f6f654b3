//! Field declarations and prepared field descriptors.
//!
//! A [`FieldDefinition`] is what a settings type declares. Preparing it
//! against a [`SettingsConfig`] yields a [`FieldDescriptor`] carrying the
//! environment variable names that may supply the field's value. This
//! happens once per schema; descriptors are immutable afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::settings::config::SettingsConfig;

/// A field's `env` declaration.
///
/// # Examples
///
/// ```
/// use envsettings::settings::EnvSpec;
///
/// let spec = EnvSpec::sequence(["APP_PORT", "PORT"]);
/// assert!(matches!(spec, EnvSpec::Sequence(ref names) if names.len() == 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvSpec {
    /// No declaration: the name is derived from prefix and field name.
    #[default]
    Absent,
    /// A single explicit name. The prefix is not applied.
    Name(String),
    /// An unordered set of names.
    Set(BTreeSet<String>),
    /// Names tried in the given order; the first present one wins.
    Sequence(Vec<String>),
}

impl EnvSpec {
    /// Build a set declaration.
    pub fn set<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(names.into_iter().map(Into::into).collect())
    }

    /// Build an ordered declaration.
    pub fn sequence<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Sequence(names.into_iter().map(Into::into).collect())
    }

    /// Interpret an untyped YAML declaration for `field`.
    ///
    /// Accepts null, a string, a non-empty sequence of strings, or a
    /// non-empty YAML set (a mapping whose values are all null, optionally
    /// tagged `!!set`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnv`] naming the value and its type for any
    /// other shape, including an empty sequence or set.
    ///
    /// # Examples
    ///
    /// ```
    /// use envsettings::settings::EnvSpec;
    ///
    /// let value: serde_yaml::Value = serde_yaml::from_str("[APP_PORT, PORT]").unwrap();
    /// let spec = EnvSpec::from_yaml("port", &value).unwrap();
    /// assert_eq!(spec, EnvSpec::sequence(["APP_PORT", "PORT"]));
    ///
    /// let bad: serde_yaml::Value = serde_yaml::from_str("42").unwrap();
    /// assert!(EnvSpec::from_yaml("port", &bad).unwrap_err().is_config_error());
    /// ```
    pub fn from_yaml(field: &str, value: &serde_yaml::Value) -> Result<Self> {
        use serde_yaml::Value as Yaml;

        let invalid = || Error::InvalidEnv {
            field: field.to_string(),
            value: render_yaml(value),
            kind: yaml_kind(value).to_string(),
        };

        match value {
            Yaml::Null => Ok(Self::Absent),
            Yaml::String(name) => Ok(Self::Name(name.clone())),
            Yaml::Sequence(items) if items.is_empty() => Err(invalid()),
            Yaml::Mapping(entries) if entries.is_empty() => Err(invalid()),
            Yaml::Sequence(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()
                .map(Self::Sequence),
            Yaml::Mapping(entries) => entries
                .iter()
                .map(|(key, val)| match (key.as_str(), val) {
                    (Some(name), Yaml::Null) => Ok(name.to_string()),
                    _ => Err(invalid()),
                })
                .collect::<Result<BTreeSet<_>>>()
                .map(Self::Set),
            Yaml::Tagged(tagged) if is_set_tag(&tagged.tag) => {
                match Self::from_yaml(field, &tagged.value)? {
                    Self::Set(names) => Ok(Self::Set(names)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}

fn is_set_tag(tag: &serde_yaml::value::Tag) -> bool {
    let tag = tag.to_string();
    let tag = tag.trim_start_matches('!');
    tag == "set" || tag == "tag:yaml.org,2002:set"
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => "null",
        Yaml::Bool(_) => "bool",
        Yaml::Number(n) if n.is_f64() => "float",
        Yaml::Number(_) => "integer",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged",
    }
}

fn render_yaml(value: &serde_yaml::Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}

/// The declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Plain text.
    #[default]
    String,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// Structured value (list, mapping, ...) decoded from text.
    Complex,
}

impl FieldKind {
    /// Whether values of this kind must be decoded from text.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex)
    }
}

/// Declaration of one settings field.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{EnvSpec, FieldDefinition, FieldKind};
///
/// let field = FieldDefinition::new("port")
///     .with_env(EnvSpec::sequence(["APP_PORT", "PORT"]))
///     .with_kind(FieldKind::Integer)
///     .with_default(8000);
///
/// assert_eq!(field.alias(), "port");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Declaration identifier.
    pub name: String,
    /// External-facing key; the name when absent.
    pub alias: Option<String>,
    /// Environment variable declaration.
    pub env: EnvSpec,
    /// Declared value type.
    pub kind: FieldKind,
    /// Value used when no source supplies one.
    pub default: Option<Value>,
    /// Whether validation fails when no value is available.
    pub required: bool,
    /// Never read this field from the environment.
    pub skip_env: bool,
}

impl FieldDefinition {
    /// Declare a string field with no alias, default or env declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            env: EnvSpec::Absent,
            kind: FieldKind::String,
            default: None,
            required: false,
            skip_env: false,
        }
    }

    /// Set the external key.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the environment declaration.
    #[must_use]
    pub fn with_env(mut self, env: EnvSpec) -> Self {
        self.env = env;
        self
    }

    /// Set the value type.
    #[must_use]
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Exclude the field from environment lookup.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// The external key.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether an alias distinct from the name is declared.
    #[must_use]
    pub fn has_alias(&self) -> bool {
        self.alias.as_deref().is_some_and(|alias| alias != self.name)
    }
}

/// Environment variable names for a field, in lookup order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvNames {
    /// Unordered names; iterated in sorted order.
    Set(BTreeSet<String>),
    /// Names tried in declaration order.
    Ordered(Vec<String>),
}

impl EnvNames {
    /// Iterate names in lookup order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Set(names) => Box::new(names.iter().map(String::as_str)),
            Self::Ordered(names) => Box::new(names.iter().map(String::as_str)),
        }
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Set(names) => names.len(),
            Self::Ordered(names) => names.len(),
        }
    }

    /// Whether there are no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lowercased(self) -> Self {
        match self {
            Self::Set(names) => Self::Set(names.iter().map(|n| n.to_lowercase()).collect()),
            Self::Ordered(names) => {
                Self::Ordered(names.iter().map(|n| n.to_lowercase()).collect())
            }
        }
    }
}

/// A prepared, immutable field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    alias: String,
    kind: FieldKind,
    default: Option<Value>,
    required: bool,
    env_names: EnvNames,
}

impl FieldDescriptor {
    /// Prepare a field against the schema configuration.
    #[must_use]
    pub fn prepare(definition: &FieldDefinition, config: &SettingsConfig) -> Self {
        let env_names = if definition.skip_env {
            EnvNames::Ordered(Vec::new())
        } else {
            resolve_env_names(definition, config)
        };

        Self {
            name: definition.name.clone(),
            alias: definition.alias().to_string(),
            kind: definition.kind,
            default: definition.default.clone(),
            required: definition.required,
            env_names,
        }
    }

    /// Declaration identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// External key under which values are collected.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Declared value type.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether environment values must be decoded.
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        self.kind.is_complex()
    }

    /// Declared default.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the field must end up with a value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Legal environment variable names in lookup order.
    #[must_use]
    pub fn env_names(&self) -> &EnvNames {
        &self.env_names
    }
}

/// Compute the environment variable names for a field.
///
/// Without a declaration the name is `prefix + field name`; explicit names
/// are used as given. Names are lower-cased when the configuration is
/// case-insensitive.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{resolve_env_names, FieldDefinition, SettingsConfig};
///
/// let config = SettingsConfig::new().with_env_prefix("APP_");
/// let names = resolve_env_names(&FieldDefinition::new("port"), &config);
/// assert_eq!(names.iter().collect::<Vec<_>>(), vec!["app_port"]);
/// ```
#[must_use]
pub fn resolve_env_names(definition: &FieldDefinition, config: &SettingsConfig) -> EnvNames {
    let names = match &definition.env {
        EnvSpec::Absent => {
            if definition.has_alias() {
                log::warn!(
                    "field '{}': aliases are no longer used to choose environment variables; \
                     declare `env` for the field instead",
                    definition.name
                );
            }
            EnvNames::Set(BTreeSet::from([format!(
                "{}{}",
                config.env_prefix(),
                definition.name
            )]))
        }
        EnvSpec::Name(name) => EnvNames::Set(BTreeSet::from([name.clone()])),
        EnvSpec::Set(names) => EnvNames::Set(names.clone()),
        EnvSpec::Sequence(names) => EnvNames::Ordered(names.clone()),
    };

    if config.case_sensitive() {
        names
    } else {
        names.lowercased()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, Once};

    use log::{Level, LevelFilter, Metadata, Record};
    use serial_test::serial;

    struct CaptureLogger;

    static LOGGER: CaptureLogger = CaptureLogger;
    static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
    static INSTALL: Once = Once::new();

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    /// Warnings logged while resolving `definition` that mention its name.
    fn warnings_for(definition: &FieldDefinition) -> Vec<String> {
        INSTALL.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(LevelFilter::Trace);
        });
        RECORDS.lock().unwrap().clear();

        resolve_env_names(definition, &SettingsConfig::new());

        let needle = format!("'{}'", definition.name);
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, message)| *level == Level::Warn && message.contains(&needle))
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn names(names: &EnvNames) -> Vec<&str> {
        names.iter().collect()
    }

    #[test]
    fn test_default_name_uses_prefix() {
        let config = SettingsConfig::new()
            .with_env_prefix("APP_")
            .with_case_sensitive(true);
        let resolved = resolve_env_names(&FieldDefinition::new("Port"), &config);
        assert_eq!(names(&resolved), vec!["APP_Port"]);
    }

    #[test]
    fn test_explicit_name_skips_prefix() {
        let config = SettingsConfig::new().with_env_prefix("APP_");
        let field = FieldDefinition::new("port").with_env(EnvSpec::Name("PORT".into()));
        assert_eq!(names(&resolve_env_names(&field, &config)), vec!["port"]);
    }

    #[test]
    fn test_sequence_preserves_order() {
        let config = SettingsConfig::new().with_case_sensitive(true);
        let field = FieldDefinition::new("port").with_env(EnvSpec::sequence(["Z_PORT", "A_PORT"]));
        assert_eq!(
            names(&resolve_env_names(&field, &config)),
            vec!["Z_PORT", "A_PORT"]
        );
    }

    #[test]
    fn test_set_lowercasing_keeps_uniqueness() {
        let config = SettingsConfig::new();
        let field = FieldDefinition::new("port").with_env(EnvSpec::set(["PORT", "port"]));
        let resolved = resolve_env_names(&field, &config);
        assert!(matches!(resolved, EnvNames::Set(_)));
        assert_eq!(names(&resolved), vec!["port"]);
    }

    #[test]
    fn test_alias_is_not_used_for_lookup() {
        let config = SettingsConfig::new();
        let field = FieldDefinition::new("database_url").with_alias("dsn");
        assert_eq!(
            names(&resolve_env_names(&field, &config)),
            vec!["database_url"]
        );
    }

    #[test]
    #[serial]
    fn test_alias_without_env_warns_once() {
        let warnings = warnings_for(&FieldDefinition::new("warned_database_url").with_alias("dsn"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("declare `env`"));
    }

    #[test]
    #[serial]
    fn test_no_alias_warning_when_not_needed() {
        assert!(warnings_for(&FieldDefinition::new("quiet_port").with_alias("quiet_port")).is_empty());
        assert!(warnings_for(&FieldDefinition::new("quiet_plain")).is_empty());
        assert!(warnings_for(
            &FieldDefinition::new("quiet_dsn")
                .with_alias("dsn")
                .with_env(EnvSpec::Name("DSN".into()))
        )
        .is_empty());
    }

    #[test]
    fn test_skip_env_has_no_names() {
        let config = SettingsConfig::new();
        let field = FieldDefinition::new("internal").skip_env();
        let descriptor = FieldDescriptor::prepare(&field, &config);
        assert!(descriptor.env_names().is_empty());
    }

    #[test]
    fn test_descriptor_carries_alias_and_kind() {
        let config = SettingsConfig::new();
        let field = FieldDefinition::new("tags")
            .with_alias("Tags")
            .with_kind(FieldKind::Complex);
        let descriptor = FieldDescriptor::prepare(&field, &config);
        assert_eq!(descriptor.alias(), "Tags");
        assert!(descriptor.is_complex());
        assert_eq!(names(descriptor.env_names()), vec!["tags"]);
    }

    #[test]
    fn test_env_spec_from_yaml_shapes() {
        let parse = |text: &str| {
            let value: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
            EnvSpec::from_yaml("port", &value)
        };

        assert_eq!(parse("~").unwrap(), EnvSpec::Absent);
        assert_eq!(parse("PORT").unwrap(), EnvSpec::Name("PORT".into()));
        assert_eq!(
            parse("[APP_PORT, PORT]").unwrap(),
            EnvSpec::sequence(["APP_PORT", "PORT"])
        );
        assert_eq!(
            parse("{APP_PORT: ~, PORT: ~}").unwrap(),
            EnvSpec::set(["APP_PORT", "PORT"])
        );
        assert_eq!(
            parse("{APP_PORT, PORT}").unwrap(),
            EnvSpec::set(["APP_PORT", "PORT"])
        );
    }

    #[test]
    fn test_env_spec_from_yaml_rejects_other_shapes() {
        let parse = |text: &str| {
            let value: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
            EnvSpec::from_yaml("port", &value).unwrap_err()
        };

        match parse("42") {
            Error::InvalidEnv { field, value, kind } => {
                assert_eq!(field, "port");
                assert_eq!(value, "42");
                assert_eq!(kind, "integer");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse("true").is_config_error());
        assert!(parse("[PORT, 1]").is_config_error());
        assert!(parse("{PORT: 1}").is_config_error());

        match parse("[]") {
            Error::InvalidEnv { value, kind, .. } => {
                assert_eq!(value, "[]");
                assert_eq!(kind, "sequence");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(parse("{}"), Error::InvalidEnv { ref kind, .. } if kind == "mapping"));
    }
}
