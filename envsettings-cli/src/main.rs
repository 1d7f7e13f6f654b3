//! Main entry point for the envsettings CLI.
//!
//! The CLI inspects how a settings schema resolves against the live process:
//! - `resolve`: Print the consolidated settings mapping
//! - `env-names`: Show the environment variable names each field reads
//! - `check`: Prepare a schema file and report problems

use clap::Parser;
use envsettings_cli::cli::{Cli, Command};
use envsettings_cli::utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let _level = envsettings::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Command::Resolve(cmd) => cmd.execute(&global),
        Command::EnvNames(cmd) => cmd.execute(&global),
        Command::Check(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
