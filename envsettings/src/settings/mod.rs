//! Settings resolution for envsettings.
//!
//! This module resolves values for a typed settings object from several
//! ranked sources:
//! - Explicit values supplied by the caller
//! - Process environment variables
//! - Auxiliary getters (dotenv files, secrets directories, custom sources)
//!
//! # Precedence
//!
//! Values are merged with the following precedence (highest to lowest):
//!
//! 1. Explicit values (via `SettingsBuilder::with_value`)
//! 2. Environment variables
//! 3. Auxiliary getters, later registrations overriding earlier ones
//! 4. Field defaults (applied by `SettingsValidator`)
//!
//! Nested mappings merge recursively: a higher-precedence partial mapping
//! only replaces the keys it names.
//!
//! # Examples
//!
//! ```
//! use envsettings::settings::{
//!     AdditionalGetter, EnvSnapshot, EnvSpec, FieldDefinition, SettingsConfig, SettingsSchema,
//!     SourceMap,
//! };
//!
//! let file = AdditionalGetter::new("defaults", || {
//!     let mut values = SourceMap::new();
//!     values.insert("timeout".to_string(), Some("30".to_string()));
//!     values.insert("port".to_string(), Some("7000".to_string()));
//!     Ok(values)
//! });
//!
//! let schema = SettingsSchema::prepare(
//!     vec![
//!         FieldDefinition::new("port").with_env(EnvSpec::sequence(["APP_PORT", "PORT"])),
//!         FieldDefinition::new("timeout"),
//!     ],
//!     SettingsConfig::new().with_getter(file),
//! )
//! .unwrap();
//!
//! let values = schema
//!     .builder()
//!     .with_environment(EnvSnapshot::from_pairs([("PORT", "8080")]))
//!     .resolve()
//!     .unwrap();
//!
//! assert_eq!(values["port"], "8080");
//! assert_eq!(values["timeout"], "30");
//! ```

pub mod builder;
pub mod config;
pub mod decoder;
pub mod environment;
pub mod field;
pub mod loader;
pub mod merger;
pub mod normalizer;
pub mod providers;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

// Re-export key types at module root
pub use builder::SettingsBuilder;
pub use config::{ExtraPolicy, SettingsConfig};
pub use decoder::Decoder;
pub use environment::{build_environ, EnvSnapshot};
pub use field::{resolve_env_names, EnvNames, EnvSpec, FieldDefinition, FieldDescriptor, FieldKind};
pub use loader::{expand_tilde, FieldSpec, SchemaFile, SchemaLoader, SourceSpec};
pub use merger::SettingsMerger;
pub use normalizer::KeyNormalizer;
pub use providers::{
    read_env_file, read_env_file_from_named_env_var, read_filesystem_directory, AdditionalGetter,
    SourceMap,
};
pub use schema::SettingsSchema;
pub use validator::SettingsValidator;
