//! Decoding of structured values supplied as text.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{BoxError, Error, Result};

type DecodeFn = dyn Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync;

/// Decoder for complex field values.
///
/// The default decoder parses JSON with `serde_json`.
///
/// # Examples
///
/// ```
/// use envsettings::settings::Decoder;
/// use serde_json::json;
///
/// let decoder = Decoder::default();
/// assert_eq!(decoder.decode(r#"["a","b"]"#).unwrap(), json!(["a", "b"]));
/// assert!(decoder.decode("not-json").is_err());
/// ```
#[derive(Clone)]
pub struct Decoder {
    decode: Arc<DecodeFn>,
}

impl Decoder {
    /// Wrap a custom decode function.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    /// Decode raw text.
    ///
    /// # Errors
    ///
    /// Returns the decode function's own error.
    pub fn decode(&self, raw: &str) -> std::result::Result<Value, BoxError> {
        (self.decode)(raw)
    }

    /// Decode the value of a complex field read from `env_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming `env_name` when decoding fails.
    pub fn decode_env(&self, env_name: &str, raw: &str) -> Result<Value> {
        self.decode(raw).map_err(|source| Error::Decode {
            env_name: env_name.to_string(),
            source,
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(|raw| serde_json::from_str(raw).map_err(Into::into))
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").finish_non_exhaustive()
    }
}
