//! Library exports for envsettings-cli.
//!
//! This module exports the CLI structure so integration tests and the
//! binary share one definition.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
