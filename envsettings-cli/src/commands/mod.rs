//! CLI command implementations.
//!
//! - `resolve`: Print the consolidated settings for a schema
//! - `env_names`: Show the environment variable names each field reads
//! - `check`: Check that a schema file is well-formed

pub mod check;
pub mod env_names;
pub mod resolve;

pub use check::CheckCommand;
pub use env_names::EnvNamesCommand;
pub use resolve::{OutputFormat, ResolveCommand};
