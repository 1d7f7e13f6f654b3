//! Command to resolve a settings schema against the live process.

use crate::error::CliError;
use crate::utils::{load_schema, parse_assignment, GlobalOptions};
use clap::{Args, ValueEnum};
use envsettings::settings::AdditionalGetter;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Output format for resolved settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON object
    #[default]
    Json,
    /// YAML mapping
    Yaml,
    /// One `KEY=value` line per entry
    Env,
}

/// Print the consolidated settings for a schema.
#[derive(Args)]
pub struct ResolveCommand {
    /// Schema file describing the settings
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Additional dotenv file, read after the schema's sources
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_files: Vec<PathBuf>,

    /// Additional secrets directory, read after the schema's sources
    #[arg(long = "secrets-dir", value_name = "DIR")]
    pub secrets_dirs: Vec<PathBuf>,

    /// Explicit value with the highest precedence
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub values: Vec<(String, String)>,

    /// Apply defaults, coerce types and reject unknown keys
    #[arg(long)]
    pub validate: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl ResolveCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let getters = self
            .env_files
            .iter()
            .cloned()
            .map(AdditionalGetter::env_file)
            .chain(self.secrets_dirs.iter().cloned().map(AdditionalGetter::secrets_dir))
            .collect();

        let schema = load_schema(&self.schema, getters)?;

        let mut builder = schema.builder();
        for (key, value) in self.values {
            builder = builder.with_value(key, value);
        }

        let settings = if self.validate {
            builder.build()?
        } else {
            builder.resolve()?
        };

        if global.verbose {
            eprintln!("Resolved {} key(s)", settings.len());
        }

        print!("{}", render(&settings, self.format)?);
        Ok(())
    }
}

/// Render a settings mapping in the requested format.
pub fn render(settings: &Map<String, Value>, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(settings)
            .map(|s| s + "\n")
            .map_err(|e| CliError::Output(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(settings).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Env => {
            let mut out = String::new();
            for (key, value) in settings {
                // Strings print raw, everything else as JSON
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let _ = writeln!(out, "{key}={rendered}");
            }
            Ok(out)
        }
    }
}
