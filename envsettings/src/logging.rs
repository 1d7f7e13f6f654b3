//! Logging infrastructure for the envsettings library.
//!
//! Library code logs through the `log` facade. This module provides a
//! simple stderr backend with three verbosity levels for binaries that
//! embed the library.

use std::env;
use std::fmt;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable consulted by [`init_logger`] when no flag is given.
pub const LOG_MODE_ENV: &str = "ENVSETTINGS_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Log levels are ordered from least verbose (Quiet) to most verbose (Verbose).
///
/// # Examples
///
/// ```
/// use envsettings::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all non-essential output.
    Quiet,
    /// Normal output level (errors and warnings).
    Normal,
    /// Verbose output (errors, warnings, info, and debug messages).
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes: "quiet", "normal", "verbose" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use envsettings::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("quiet").unwrap(), LogLevel::Quiet);
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("invalid").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The `log` filter corresponding to this level.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Error,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

/// A stderr-based `log` backend.
///
/// Records are printed as `LEVEL: message`.
///
/// # Examples
///
/// ```
/// use envsettings::{LogLevel, Logger};
/// use log::Log;
///
/// let logger = Logger::new(LogLevel::Normal);
/// assert!(logger.enabled(&log::Metadata::builder().level(log::Level::Warn).build()));
/// assert!(!logger.enabled(&log::Metadata::builder().level(log::Level::Debug).build()));
/// ```
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a new logger with the specified log level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the current log level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Installs this logger as the global `log` backend.
    ///
    /// Installing twice is a no-op; the first logger stays in place.
    pub fn install(self) {
        let filter = self.level.filter();
        if log::set_boxed_logger(Box::new(self)).is_ok() {
            log::set_max_level(filter);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Chooses a log level from CLI flags and the environment.
///
/// The priority order is:
/// 1. CLI flags (verbose/quiet)
/// 2. `ENVSETTINGS_LOG_MODE` environment variable
/// 3. Default (Normal)
///
/// If both `verbose` and `quiet` are true, `verbose` takes precedence.
#[must_use]
pub fn select_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Verbose;
    }
    if quiet {
        return LogLevel::Quiet;
    }

    if let Ok(env_value) = env::var(LOG_MODE_ENV) {
        if let Ok(level) = LogLevel::parse(&env_value) {
            return level;
        }
    }

    LogLevel::Normal
}

/// Initializes and installs the stderr logger.
///
/// See [`select_level`] for how the level is chosen.
///
/// # Examples
///
/// ```
/// use envsettings::{init_logger, LogLevel};
///
/// let level = init_logger(true, false);
/// assert_eq!(level, LogLevel::Verbose);
/// ```
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = select_level(verbose, quiet);
    Logger::new(level).install();
    level
}
