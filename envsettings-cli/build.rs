//! Build script for envsettings-cli.
//!
//! This script generates the man page at build time using clap_mangen.
//! The generated page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("FILE")
        .help("Schema file describing the settings")
        .required(true)
}

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("envsettings")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve layered application settings")
        .long_about(
            "Resolve application settings from explicit values, environment variables, \
             dotenv files and secrets directories, in that order of precedence",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("resolve")
                .about("Print the consolidated settings for a schema")
                .arg(schema_arg())
                .arg(
                    Arg::new("env-file")
                        .long("env-file")
                        .value_name("PATH")
                        .help("Additional dotenv file, read after the schema's sources")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("secrets-dir")
                        .long("secrets-dir")
                        .value_name("DIR")
                        .help("Additional secrets directory, read after the schema's sources")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("KEY=VALUE")
                        .help("Explicit value with the highest precedence")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("validate")
                        .long("validate")
                        .help("Apply defaults, coerce types and reject unknown keys")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["json", "yaml", "env"])
                        .default_value("json")
                        .help("Output format"),
                ),
            Command::new("env-names")
                .about("Show the environment variable names each field reads")
                .arg(schema_arg()),
            Command::new("check")
                .about("Check that a schema file is well-formed")
                .arg(schema_arg()),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("envsettings.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
