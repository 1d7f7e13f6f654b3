//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CheckCommand, EnvNamesCommand, ResolveCommand};
use clap::{Parser, Subcommand};

/// Command-line tool for inspecting layered settings resolution.
#[derive(Parser)]
#[command(name = "envsettings")]
#[command(version, about = "Resolve layered application settings", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the consolidated settings for a schema
    Resolve(ResolveCommand),

    /// Show the environment variable names each field reads
    EnvNames(EnvNamesCommand),

    /// Check that a schema file is well-formed
    Check(CheckCommand),
}
