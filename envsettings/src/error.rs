//! Error types for the envsettings library.
//!
//! This module provides the error hierarchy for settings resolution, using
//! `thiserror` for ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error type produced by injected decoders and custom getters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for operations that may fail with an envsettings error.
///
/// # Examples
///
/// ```
/// use envsettings::{Error, Result};
///
/// fn example_operation() -> Result<String> {
///     Ok("8080".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the envsettings library.
///
/// `InvalidEnv` and `Decode` form the configuration error class (see
/// [`Error::is_config_error`]). Errors raised by auxiliary getters keep their
/// own variant and are never re-wrapped by the resolution engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A field's `env` declaration has an unsupported shape.
    #[error("invalid field env: {value} ({kind}); should be string, list or set")]
    InvalidEnv {
        /// The field carrying the declaration.
        field: String,
        /// Rendering of the offending value.
        value: String,
        /// The type name of the offending value.
        kind: String,
    },

    /// A complex field's environment value could not be decoded.
    #[error("error parsing JSON for \"{env_name}\": {source}")]
    Decode {
        /// The environment variable name that supplied the value.
        env_name: String,
        /// The underlying decoder failure.
        #[source]
        source: BoxError,
    },

    /// A dotenv file could not be read or parsed.
    #[error("env file {}: {source}", path.display())]
    EnvFile {
        /// The dotenv file path.
        path: PathBuf,
        /// The underlying dotenv error.
        #[source]
        source: dotenvy::Error,
    },

    /// A named environment variable expected to hold a path is not set.
    #[error("environment variable {name} is not set")]
    MissingEnvVar {
        /// The variable name.
        name: String,
    },

    /// An error raised by a custom auxiliary getter, surfaced verbatim.
    #[error("{0}")]
    Provider(#[source] BoxError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A schema document could not be parsed.
    #[error("schema error: {0}")]
    Schema(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A required field has no value from any source and no default.
    #[error("field required: {field}")]
    MissingField {
        /// The field alias.
        field: String,
    },

    /// A key matched no field while unknown keys are forbidden.
    #[error("extra fields not permitted: {field}")]
    ExtraField {
        /// The unrecognized key.
        field: String,
    },

    /// The validated mapping could not be deserialized into the target type.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an arbitrary error raised by a custom getter.
    ///
    /// The wrapped error is displayed unchanged and can be recovered with
    /// `downcast_ref` on the inner box.
    ///
    /// # Examples
    ///
    /// ```
    /// use envsettings::Error;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "vault offline");
    /// let err = Error::provider(io);
    /// assert_eq!(err.to_string(), "vault offline");
    /// ```
    pub fn provider<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider(Box::new(err))
    }

    /// Check whether the error belongs to the configuration error class.
    ///
    /// # Examples
    ///
    /// ```
    /// use envsettings::Error;
    ///
    /// let err = Error::InvalidEnv {
    ///     field: "port".into(),
    ///     value: "42".into(),
    ///     kind: "integer".into(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidEnv { .. } | Self::Decode { .. })
    }

    /// Check whether the error was raised by the validation layer.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::MissingField { .. }
                | Self::ExtraField { .. }
                | Self::Deserialize(_)
        )
    }
}
