#![deny(missing_docs)]
//! Shared logging utilities for the crawldash workspace.
//!
//! This crate provides the `dash_*` logging macros used across the codebase,
//! the logger initializer used by the CLI and a minimal test initializer.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use thiserror::Error;

/// File name used when logging to a file, relative to the working directory.
pub const LOG_FILE_NAME: &str = "crawldash.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! dash_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! dash_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! dash_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! dash_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! dash_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to `./crawldash.log` in the current directory.
    #[default]
    File,
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

impl LogDestination {
    /// Identifier used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            LogDestination::File => "file",
            LogDestination::Terminal => "terminal",
            LogDestination::Both => "both",
        }
    }
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a log destination name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log destination '{0}' (expected file, terminal or both)")]
pub struct UnknownDestination(pub String);

impl FromStr for LogDestination {
    type Err = UnknownDestination;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogDestination::File),
            "terminal" => Ok(LogDestination::Terminal),
            "both" => Ok(LogDestination::Both),
            other => Err(UnknownDestination(other.to_string())),
        }
    }
}

/// Initialize the global logger with the given destination and level.
///
/// For `LogDestination::File` or `Both`, appends to `./crawldash.log` in the
/// current working directory so successive commands share one history. With
/// `Both`, the terminal only receives warnings and errors; stdout stays free
/// for command output. Does nothing if a logger is already installed.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let log_path = PathBuf::from(".").join(LOG_FILE_NAME);
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match open_log_file(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(level, build_config(), file)),
            Err(err) => eprintln!("Warning: Could not open log file at {:?}: {}", log_path, err),
        }
    }
    match destination {
        LogDestination::Terminal => loggers.push(terminal_logger(level)),
        LogDestination::Both => loggers.push(terminal_logger(level.min(LevelFilter::Warn))),
        LogDestination::File => {}
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn terminal_logger(level: LevelFilter) -> Box<TermLogger> {
    TermLogger::new(level, build_config(), TerminalMode::Stderr, ColorChoice::Auto)
}

/// HTTP stack internals are noisy at debug level; only crawldash targets pass.
fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("crawldash")
        .build()
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
