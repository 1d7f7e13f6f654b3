//! Utility functions for CLI operations.

use crate::error::CliError;
use envsettings::settings::{AdditionalGetter, SchemaLoader, SettingsSchema};
use std::path::Path;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Load a schema file, registering `extra_getters` after its own sources.
pub fn load_schema(
    path: &Path,
    extra_getters: Vec<AdditionalGetter>,
) -> Result<SettingsSchema, CliError> {
    if !path.exists() {
        return Err(CliError::InvalidArguments(format!(
            "Schema file not found: {}",
            path.display()
        )));
    }
    Ok(SchemaLoader::load_file_with(path, extra_getters)?)
}

/// Parse a `KEY=VALUE` assignment.
///
/// The value may itself contain `=`; only the first one separates.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
