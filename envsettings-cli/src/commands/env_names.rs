//! Command to show the environment variable names each field reads.

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions};
use clap::Args;
use envsettings::settings::SettingsSchema;
use std::path::PathBuf;

/// Show the environment variable names each field reads.
#[derive(Args)]
pub struct EnvNamesCommand {
    /// Schema file describing the settings
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
}

impl EnvNamesCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let schema = load_schema(&self.schema, Vec::new())?;
        print!("{}", describe(&schema));
        Ok(())
    }
}

/// One line per field: its alias followed by its names in lookup order.
pub fn describe(schema: &SettingsSchema) -> String {
    let mut out = String::new();
    for field in schema.fields() {
        let names = field.env_names();
        let rendered = if names.is_empty() {
            "(not read from environment)".to_string()
        } else {
            names.iter().collect::<Vec<_>>().join(", ")
        };
        out.push_str(field.alias());
        out.push_str(": ");
        out.push_str(&rendered);
        out.push('\n');
    }
    out
}
