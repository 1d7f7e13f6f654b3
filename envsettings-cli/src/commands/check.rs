//! Command to check a settings schema file.

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions};
use clap::Args;
use std::path::PathBuf;

/// Check that a schema file is well-formed.
#[derive(Args)]
pub struct CheckCommand {
    /// Schema file to check
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
}

impl CheckCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let schema = load_schema(&self.schema, Vec::new())?;

        if !global.quiet {
            println!(
                "Schema is valid ({} field(s), {} source(s))",
                schema.fields().len(),
                schema.config().getters().len()
            );
        }
        Ok(())
    }
}
