// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `graphlaunch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "graphlaunch",
    version,
    about = "Run a native graph binary on N barrier-synchronized instances.",
    long_about = None
)]
pub struct CliArgs {
    /// Number of instances to run.
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub instances: usize,

    /// Optional settings file (TOML). Built-in defaults are used otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run identifier used to name the barrier. Random if omitted.
    #[arg(long, value_name = "ID")]
    pub run_id: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `--debug`, then `GRAPHLAUNCH_LOG`, then `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long)]
    pub debug: bool,

    /// Coordination service connection string, exported to the binary as
    /// `ZK_SERVERS`.
    pub coordination: String,

    /// Path of the graph binary.
    pub binary: PathBuf,

    /// Graph input path.
    pub input: PathBuf,

    /// Input format understood by the binary.
    pub format: String,

    /// Output path.
    ///
    /// For `TSC` with more than one instance, instance `i` writes
    /// `<OUTPUT>-i` so that no two instances truncate the same file.
    pub output: PathBuf,
}

impl CliArgs {
    /// Level requested on the command line, if any. `--log-level` wins over
    /// `--debug`.
    pub fn requested_log_level(&self) -> Option<LogLevel> {
        match (self.log_level, self.debug) {
            (Some(level), _) => Some(level),
            (None, true) => Some(LogLevel::Debug),
            (None, false) => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
