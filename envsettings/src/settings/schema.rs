//! Prepared settings schemas.
//!
//! A schema binds a list of field definitions to a [`SettingsConfig`] and
//! computes every field's environment names exactly once. The resulting
//! descriptors are shared, immutable, and safe to read from many threads.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::settings::builder::SettingsBuilder;
use crate::settings::config::SettingsConfig;
use crate::settings::decoder::Decoder;
use crate::settings::environment::{build_environ, EnvSnapshot};
use crate::settings::field::{EnvSpec, FieldDefinition, FieldDescriptor};
use crate::settings::merger::SettingsMerger;
use crate::settings::normalizer::KeyNormalizer;

/// A settings type ready for resolution.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{
///     EnvSnapshot, EnvSpec, FieldDefinition, SettingsConfig, SettingsSchema,
/// };
///
/// let schema = SettingsSchema::prepare(
///     vec![FieldDefinition::new("port").with_env(EnvSpec::sequence(["APP_PORT", "PORT"]))],
///     SettingsConfig::new(),
/// )
/// .unwrap();
///
/// let values = schema
///     .resolve_with(serde_json::Map::new(), &EnvSnapshot::from_pairs([("PORT", "8080")]))
///     .unwrap();
/// assert_eq!(values["port"], "8080");
/// ```
#[derive(Debug, Clone)]
pub struct SettingsSchema {
    fields: Arc<[FieldDescriptor]>,
    config: Arc<SettingsConfig>,
    normalizer: Arc<KeyNormalizer>,
    decoder: Decoder,
}

impl SettingsSchema {
    /// Prepare field definitions against a configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when two fields share a name or alias. In
    ///   case-insensitive schemas aliases differing only by case collide.
    /// - [`Error::InvalidEnv`] when a field declares an empty set or list of
    ///   environment names without `skip_env`.
    pub fn prepare(definitions: Vec<FieldDefinition>, config: SettingsConfig) -> Result<Self> {
        let mut names = HashSet::new();
        let mut aliases = HashSet::new();
        for definition in &definitions {
            if !names.insert(definition.name.as_str()) {
                return Err(Error::Validation {
                    field: definition.name.clone(),
                    message: "duplicate field name".into(),
                });
            }

            let alias = if config.case_sensitive() {
                definition.alias().to_string()
            } else {
                definition.alias().to_lowercase()
            };
            if !aliases.insert(alias) {
                return Err(Error::Validation {
                    field: definition.name.clone(),
                    message: format!("duplicate alias '{}'", definition.alias()),
                });
            }

            let empty_kind = match &definition.env {
                EnvSpec::Set(list) if list.is_empty() => Some("set"),
                EnvSpec::Sequence(list) if list.is_empty() => Some("sequence"),
                _ => None,
            };
            if let (Some(kind), false) = (empty_kind, definition.skip_env) {
                return Err(Error::InvalidEnv {
                    field: definition.name.clone(),
                    value: "[]".into(),
                    kind: kind.into(),
                });
            }
        }

        let fields: Arc<[FieldDescriptor]> = definitions
            .iter()
            .map(|definition| FieldDescriptor::prepare(definition, &config))
            .collect();

        let normalizer = KeyNormalizer::new(
            fields.iter().map(FieldDescriptor::alias),
            config.case_sensitive(),
            config.extra(),
            config.env_prefix(),
        );

        Ok(Self {
            fields,
            config: Arc::new(config),
            normalizer: Arc::new(normalizer),
            decoder: Decoder::default(),
        })
    }

    /// Replace the decoder used for complex fields.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Prepared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by alias.
    #[must_use]
    pub fn field(&self, alias: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.alias() == alias)
    }

    /// The configuration the schema was prepared with.
    #[must_use]
    pub fn config(&self) -> &SettingsConfig {
        &self.config
    }

    /// The complex-value decoder.
    #[must_use]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Start a resolution with builder options.
    #[must_use]
    pub fn builder(&self) -> SettingsBuilder<'_> {
        SettingsBuilder::new(self)
    }

    /// Run every auxiliary getter and union their normalized results.
    ///
    /// Later getters override earlier ones key by key.
    ///
    /// # Errors
    ///
    /// Propagates the first getter error unchanged.
    pub fn additional_values(&self) -> Result<Map<String, Value>> {
        let mut result = Map::new();
        for getter in self.config.getters() {
            let raw = getter.invoke()?;
            let normalized = self.normalizer.normalize(raw);
            log::debug!(
                "source '{}' contributed {} keys",
                getter.name(),
                normalized.len()
            );
            result.extend(normalized);
        }
        Ok(result)
    }

    /// Collect environment values from `snapshot`, keyed by alias.
    ///
    /// The snapshot is case-folded here when the schema is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when a complex field fails to decode.
    pub fn environ_values(&self, snapshot: &EnvSnapshot) -> Result<Map<String, Value>> {
        if self.config.case_sensitive() {
            build_environ(&self.fields, snapshot, &self.decoder)
        } else {
            build_environ(&self.fields, &snapshot.case_folded(), &self.decoder)
        }
    }

    /// Consolidate explicit values, the process environment and auxiliary
    /// sources into one mapping.
    ///
    /// # Errors
    ///
    /// See [`SettingsSchema::resolve_with`].
    pub fn resolve(&self, explicit: Map<String, Value>) -> Result<Map<String, Value>> {
        self.resolve_with(explicit, &EnvSnapshot::from_process())
    }

    /// Consolidate using an explicit environment snapshot.
    ///
    /// Precedence, highest first: explicit values, environment, auxiliary
    /// sources. Explicit values are neither normalized nor decoded.
    ///
    /// # Errors
    ///
    /// Propagates auxiliary getter errors unchanged, then returns
    /// [`Error::Decode`] for a complex environment value that fails to
    /// decode.
    pub fn resolve_with(
        &self,
        explicit: Map<String, Value>,
        snapshot: &EnvSnapshot,
    ) -> Result<Map<String, Value>> {
        let additional = self.additional_values()?;
        let environ = self.environ_values(snapshot)?;
        Ok(SettingsMerger::merge(&additional, &environ, &explicit))
    }
}
