//! Loading settings schemas from YAML documents.
//!
//! A schema document declares the type-level configuration, the auxiliary
//! sources and the fields of a settings type:
//!
//! ```yaml
//! env_prefix: APP_
//! case_sensitive: false
//! extra: forbid
//! sources:
//!   - env_file: .env
//!   - secrets_dir: /run/secrets
//! fields:
//!   port:
//!     type: integer
//!     env: [APP_PORT, PORT]
//!     default: 8000
//!   tags:
//!     type: complex
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::settings::config::{ExtraPolicy, SettingsConfig};
use crate::settings::field::{EnvSpec, FieldDefinition, FieldKind};
use crate::settings::providers::AdditionalGetter;
use crate::settings::schema::SettingsSchema;

/// A parsed schema document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Prefix for default environment variable names.
    #[serde(default)]
    pub env_prefix: String,

    /// Match names case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Extra-key policy.
    #[serde(default)]
    pub extra: ExtraPolicy,

    /// Auxiliary sources in registration order.
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    /// Fields in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, Option<FieldSpec>>,
}

/// One auxiliary source entry. Exactly one key must be set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    /// A dotenv file.
    pub env_file: Option<PathBuf>,
    /// An environment variable holding the path of a dotenv file.
    pub env_file_from_var: Option<String>,
    /// A directory of secret files.
    pub secrets_dir: Option<PathBuf>,
}

/// One field entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// External key.
    pub alias: Option<String>,

    /// Untyped `env` declaration, checked when the schema is prepared.
    #[serde(default)]
    pub env: serde_yaml::Value,

    /// Value type.
    #[serde(rename = "type", default)]
    pub kind: FieldKind,

    /// Default value.
    pub default: Option<serde_json::Value>,

    /// Fail validation when no value is available.
    #[serde(default)]
    pub required: bool,

    /// Never read from the environment.
    #[serde(default)]
    pub skip_env: bool,
}

impl SchemaFile {
    /// Parse a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for malformed YAML or unknown keys.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Prepare the schema.
    ///
    /// Relative source paths resolve against `base_dir`; `extra_getters` are
    /// registered after the document's own sources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnv`] for a malformed `env` declaration,
    /// [`Error::Validation`] for a malformed source entry or duplicate
    /// alias, and [`Error::InvalidPath`] when `~` cannot be expanded.
    pub fn prepare(
        self,
        base_dir: &Path,
        extra_getters: Vec<AdditionalGetter>,
    ) -> Result<SettingsSchema> {
        let mut config = SettingsConfig::new()
            .with_env_prefix(self.env_prefix)
            .with_case_sensitive(self.case_sensitive)
            .with_extra(self.extra);

        for (index, source) in self.sources.iter().enumerate() {
            config = config.with_getter(source.to_getter(index, base_dir)?);
        }
        for getter in extra_getters {
            config = config.with_getter(getter);
        }

        let mut definitions = Vec::with_capacity(self.fields.len());
        for (name, spec) in self.fields {
            let spec = spec.unwrap_or_default();
            let env = EnvSpec::from_yaml(&name, &spec.env)?;
            definitions.push(FieldDefinition {
                alias: spec.alias,
                env,
                kind: spec.kind,
                default: spec.default,
                required: spec.required,
                skip_env: spec.skip_env,
                name,
            });
        }

        SettingsSchema::prepare(definitions, config)
    }
}

impl SourceSpec {
    fn to_getter(&self, index: usize, base_dir: &Path) -> Result<AdditionalGetter> {
        match (&self.env_file, &self.env_file_from_var, &self.secrets_dir) {
            (Some(path), None, None) => Ok(AdditionalGetter::env_file(resolve_path(
                path, base_dir,
            )?)),
            (None, Some(var), None) => Ok(AdditionalGetter::env_file_from_var(var.clone())),
            (None, None, Some(path)) => Ok(AdditionalGetter::secrets_dir(resolve_path(
                path, base_dir,
            )?)),
            _ => Err(Error::Validation {
                field: format!("sources[{index}]"),
                message: "expected exactly one of env_file, env_file_from_var, secrets_dir"
                    .into(),
            }),
        }
    }
}

/// Loads schema documents from disk.
///
/// # Examples
///
/// ```no_run
/// use envsettings::settings::SchemaLoader;
/// use std::path::Path;
///
/// let schema = SchemaLoader::load_file(Path::new("settings.yaml")).unwrap();
/// let values = schema.resolve(serde_json::Map::new()).unwrap();
/// ```
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load and prepare a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the
    /// errors of [`SchemaFile::parse`] and [`SchemaFile::prepare`].
    pub fn load_file(path: &Path) -> Result<SettingsSchema> {
        Self::load_file_with(path, Vec::new())
    }

    /// Load a schema file, registering `extra_getters` after its sources.
    ///
    /// # Errors
    ///
    /// See [`SchemaLoader::load_file`].
    pub fn load_file_with(
        path: &Path,
        extra_getters: Vec<AdditionalGetter>,
    ) -> Result<SettingsSchema> {
        let path = expand_tilde(path)?;
        let contents = fs::read_to_string(&path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        SchemaFile::parse(&contents)?.prepare(base_dir, extra_getters)
    }
}

/// Resolve a source path: expand `~`, then anchor relative paths at `base_dir`.
fn resolve_path(path: &Path, base_dir: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base_dir.join(expanded))
    }
}

/// Expand tilde (~) in a path to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8, the home directory
/// cannot be determined, or `~user` syntax is used.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_str().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Path contains invalid UTF-8".to_string(),
    })?;

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Cannot determine home directory".to_string(),
    })?;

    if path_str == "~" {
        Ok(home)
    } else if let Some(rest) = path_str
        .strip_prefix("~/")
        .or_else(|| path_str.strip_prefix("~\\"))
    {
        Ok(home.join(rest))
    } else {
        Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::environment::EnvSnapshot;
    use serde_json::{json, Map, Value};
    use tempfile::TempDir;

    const SCHEMA: &str = r"
env_prefix: APP_
sources:
  - env_file: app.env
  - secrets_dir: secrets
fields:
  port:
    type: integer
    env: [APP_PORT, PORT]
    default: 8000
  host:
  tags:
    type: complex
  token:
    alias: api_token
    env: API_TOKEN
    required: true
";

    #[test]
    fn test_parse_and_prepare() {
        let dir = TempDir::new().unwrap();
        let schema = SchemaFile::parse(SCHEMA)
            .unwrap()
            .prepare(dir.path(), Vec::new())
            .unwrap();

        let aliases: Vec<_> = schema.fields().iter().map(|f| f.alias()).collect();
        assert_eq!(aliases, vec!["port", "host", "tags", "api_token"]);
        assert_eq!(schema.config().env_prefix(), "APP_");
        assert_eq!(schema.config().getters().len(), 2);

        let host = schema.field("host").unwrap();
        assert_eq!(host.env_names().iter().collect::<Vec<_>>(), vec!["app_host"]);
        assert!(schema.field("tags").unwrap().is_complex());
    }

    #[test]
    fn test_relative_sources_resolve_against_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.env"), "HOST=file-host\n").unwrap();
        fs::create_dir(dir.path().join("secrets")).unwrap();
        fs::write(dir.path().join("secrets").join("api_token"), "t0ken\n").unwrap();

        let schema = SchemaFile::parse(SCHEMA)
            .unwrap()
            .prepare(dir.path(), Vec::new())
            .unwrap();

        let values = schema
            .resolve_with(Map::new(), &EnvSnapshot::from_pairs([("PORT", "9000")]))
            .unwrap();
        assert_eq!(
            Value::Object(values),
            json!({"host": "file-host", "api_token": "t0ken", "port": "9000"})
        );
    }

    #[test]
    fn test_invalid_env_shape_is_config_error() {
        let err = SchemaFile::parse("fields:\n  port:\n    env: 42\n")
            .unwrap()
            .prepare(Path::new("."), Vec::new())
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("42"));

        let err = SchemaFile::parse("fields:\n  port:\n    env: []\n")
            .unwrap()
            .prepare(Path::new("."), Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnv { ref kind, .. } if kind == "sequence"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            SchemaFile::parse("prefix: APP_\n"),
            Err(Error::Schema(_))
        ));
        assert!(SchemaFile::parse("fields:\n  port:\n    colour: red\n").is_err());
    }

    #[test]
    fn test_source_entry_needs_exactly_one_key() {
        let err = SchemaFile::parse("sources:\n  - env_file: a\n    secrets_dir: b\n")
            .unwrap()
            .prepare(Path::new("."), Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "sources[0]"));
    }

    #[test]
    fn test_load_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = SchemaLoader::load_file(&dir.path().join("none.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_expand_tilde() {
        let plain = expand_tilde(Path::new("/etc/app")).unwrap();
        assert_eq!(plain, PathBuf::from("/etc/app"));

        if let Some(home) = home::home_dir() {
            assert_eq!(expand_tilde(Path::new("~")).unwrap(), home);
            assert_eq!(expand_tilde(Path::new("~/x")).unwrap(), home.join("x"));
        }
        assert!(expand_tilde(Path::new("~bob/x")).is_err());
    }
}
