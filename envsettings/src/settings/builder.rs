//! Builder-style resolution of a settings schema.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::settings::environment::EnvSnapshot;
use crate::settings::merger::SettingsMerger;
use crate::settings::schema::SettingsSchema;
use crate::settings::validator::SettingsValidator;

/// Configures and runs one resolution of a [`SettingsSchema`].
///
/// Every call to [`resolve`](Self::resolve) re-reads all sources; nothing is
/// cached between resolutions.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{
///     EnvSnapshot, FieldDefinition, FieldKind, SettingsConfig, SettingsSchema,
/// };
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct App {
///     port: u16,
///     debug: bool,
/// }
///
/// let schema = SettingsSchema::prepare(
///     vec![
///         FieldDefinition::new("port").with_kind(FieldKind::Integer).with_default(8000),
///         FieldDefinition::new("debug").with_kind(FieldKind::Boolean).with_default(false),
///     ],
///     SettingsConfig::new().with_env_prefix("APP_"),
/// )
/// .unwrap();
///
/// let app: App = schema
///     .builder()
///     .with_environment(EnvSnapshot::from_pairs([("APP_DEBUG", "yes")]))
///     .with_value("port", 9000)
///     .extract()
///     .unwrap();
///
/// assert_eq!(app.port, 9000);
/// assert!(app.debug);
/// ```
#[derive(Debug)]
pub struct SettingsBuilder<'a> {
    schema: &'a SettingsSchema,
    explicit: Map<String, Value>,
    environment: Option<EnvSnapshot>,
    skip_env: bool,
    skip_getters: bool,
}

impl<'a> SettingsBuilder<'a> {
    /// Create a builder for `schema`.
    #[must_use]
    pub fn new(schema: &'a SettingsSchema) -> Self {
        Self {
            schema,
            explicit: Map::new(),
            environment: None,
            skip_env: false,
            skip_getters: false,
        }
    }

    /// Supply one explicit value; explicit values have the highest precedence.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.explicit.insert(key.into(), value.into());
        self
    }

    /// Supply explicit values, deep-merged over any already given.
    #[must_use]
    pub fn with_values(mut self, values: Map<String, Value>) -> Self {
        SettingsMerger::merge_into(&mut self.explicit, &values);
        self
    }

    /// Use `snapshot` instead of reading the process environment.
    #[must_use]
    pub fn with_environment(mut self, snapshot: EnvSnapshot) -> Self {
        self.environment = Some(snapshot);
        self
    }

    /// Do not read environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Do not run auxiliary getters.
    #[must_use]
    pub fn skip_getters(mut self) -> Self {
        self.skip_getters = true;
        self
    }

    /// Produce the consolidated mapping.
    ///
    /// # Errors
    ///
    /// Propagates auxiliary getter errors unchanged and returns
    /// [`crate::Error::Decode`] for complex environment values that fail to
    /// decode.
    pub fn resolve(self) -> Result<Map<String, Value>> {
        let additional = if self.skip_getters {
            Map::new()
        } else {
            self.schema.additional_values()?
        };

        let environ = if self.skip_env {
            Map::new()
        } else {
            match &self.environment {
                Some(snapshot) => self.schema.environ_values(snapshot)?,
                None => self.schema.environ_values(&EnvSnapshot::from_process())?,
            }
        };

        Ok(SettingsMerger::merge(&additional, &environ, &self.explicit))
    }

    /// Resolve and run the validation layer.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, then validation errors.
    pub fn build(self) -> Result<Map<String, Value>> {
        let schema = self.schema;
        let consolidated = self.resolve()?;
        SettingsValidator::validate(schema, consolidated)
    }

    /// Resolve, validate, and deserialize into `T`.
    ///
    /// # Errors
    ///
    /// Returns resolution and validation errors, or
    /// [`crate::Error::Deserialize`] if the validated mapping does not fit `T`.
    pub fn extract<T: DeserializeOwned>(self) -> Result<T> {
        let validated = self.build()?;
        Ok(serde_json::from_value(Value::Object(validated))?)
    }
}
