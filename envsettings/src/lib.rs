#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # envsettings
//!
//! A library for resolving configuration values for a typed settings
//! object from explicit values, environment variables and pluggable
//! auxiliary sources.
//!
//! ## Core Types
//!
//! - [`SettingsSchema`]: a prepared settings type with per-field
//!   environment names
//! - [`SettingsConfig`] and [`FieldDefinition`]: type-level and field-level
//!   declarations
//! - [`AdditionalGetter`]: auxiliary sources such as dotenv files and
//!   secrets directories
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use envsettings::{EnvSnapshot, FieldDefinition, FieldKind, SettingsConfig, SettingsSchema};
//!
//! let schema = SettingsSchema::prepare(
//!     vec![FieldDefinition::new("tags").with_kind(FieldKind::Complex)],
//!     SettingsConfig::new(),
//! )
//! .unwrap();
//!
//! let env = EnvSnapshot::from_pairs([("TAGS", r#"["a","b"]"#)]);
//! let values = schema.resolve_with(serde_json::Map::new(), &env).unwrap();
//! assert_eq!(values["tags"], serde_json::json!(["a", "b"]));
//!
//! let env = EnvSnapshot::from_pairs([("TAGS", "not-json")]);
//! let err = schema.resolve_with(serde_json::Map::new(), &env).unwrap_err();
//! assert!(err.is_config_error());
//! ```

pub mod error;
pub mod logging;
pub mod settings;

// Re-export key types at crate root for convenience
pub use error::{BoxError, Error, Result};
pub use logging::{init_logger, select_level, LogLevel, Logger};
pub use settings::{
    AdditionalGetter, Decoder, EnvSnapshot, EnvSpec, ExtraPolicy, FieldDefinition, FieldKind,
    SchemaLoader, SettingsBuilder, SettingsConfig, SettingsSchema, SourceMap,
};
