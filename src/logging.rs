// src/logging.rs

//! Logging for `graphlaunch`.
//!
//! Two layers:
//! - [`init_logging`] installs the process-wide `tracing-subscriber` on
//!   stderr. The level comes from [`resolve_level`].
//! - [`LogSink`] is handed to the driver, orchestrator and capture pipeline.
//!   Captured child output and driver lifecycle records go through it, so
//!   tests can swap in a [`MemorySink`] and assert on exactly what was logged.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::types::StreamTag;

/// Environment variable read when no level is given on the command line.
pub const LOG_ENV: &str = "GRAPHLAUNCH_LOG";

/// Install the stderr subscriber. Call once, from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env_level.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Pick the log level: the CLI level (`--log-level` or `--debug`), then the
/// value of `GRAPHLAUNCH_LOG`, then `info`. An unrecognised
/// `GRAPHLAUNCH_LOG` value is ignored.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_value.and_then(parse_level_str))
        .unwrap_or(Level::INFO)
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// One record written to a [`LogSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    /// `Some` for lines captured from the child process.
    pub stream: Option<StreamTag>,
    pub message: String,
}

impl LogRecord {
    /// A line of child output.
    pub fn line(stream: StreamTag, message: impl Into<String>) -> Self {
        Self {
            level: Level::INFO,
            stream: Some(stream),
            message: message.into(),
        }
    }

    /// A lifecycle record emitted by the launcher itself.
    pub fn event(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            stream: None,
            message: message.into(),
        }
    }
}

/// Destination for captured output and lifecycle records.
pub trait LogSink: Send + Sync + Debug {
    fn record(&self, record: LogRecord);
}

/// Production sink: forwards every record to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    instance: usize,
}

impl TracingSink {
    pub fn new(instance: usize) -> Self {
        Self { instance }
    }
}

impl LogSink for TracingSink {
    fn record(&self, record: LogRecord) {
        let instance = self.instance;
        let stream = record.stream.map(StreamTag::as_str).unwrap_or("driver");
        let msg = record.message;
        match record.level {
            Level::ERROR => tracing::error!(instance, stream, "{}", msg),
            Level::WARN => tracing::warn!(instance, stream, "{}", msg),
            Level::INFO => tracing::info!(instance, stream, "{}", msg),
            Level::DEBUG => tracing::debug!(instance, stream, "{}", msg),
            _ => tracing::trace!(instance, stream, "{}", msg),
        }
    }
}

/// In-memory sink for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Messages captured from the given child stream, in arrival order.
    pub fn lines(&self, stream: StreamTag) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.stream == Some(stream))
            .map(|r| r.message)
            .collect()
    }

    /// Lifecycle messages (records without a stream tag).
    pub fn events(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.stream.is_none())
            .map(|r| r.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: LogRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record);
        }
    }
}
