// src/errors.rs

//! Crate-wide error type.
//!
//! Each variant corresponds to one failure kind of a coordinated launch; the
//! driver decides (via [`crate::types::FailurePolicy`]) whether a given error
//! is returned to the caller or only logged.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    /// A required path, argument or environment variable is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Fewer than `parties` participants reached the barrier in time.
    #[error("Barrier '{id}' timed out after {timeout:?} waiting for {parties} parties")]
    BarrierTimeout {
        id: String,
        parties: usize,
        timeout: Duration,
    },

    /// The same barrier id was used with two different party counts.
    #[error("Barrier '{id}' registered with {registered} parties, requested with {requested}")]
    BarrierMismatch {
        id: String,
        registered: usize,
        requested: usize,
    },

    /// The coordination service failed for a reason other than a timeout.
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// The binary is missing, not executable, or failed to spawn.
    #[error("Process launch error: {0}")]
    ProcessLaunch(String),

    /// The child exited with a non-zero code and the exit policy propagates it.
    #[error("Process exited with code {code}")]
    ProcessExitNonZero { code: i32 },

    /// Draining one of the output streams failed.
    #[error("Capture error on {stream}: {source}")]
    CaptureIo {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaunchError {
    /// Short machine-friendly name of the failure kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            LaunchError::ConfigError(_) | LaunchError::TomlError(_) => "configuration",
            LaunchError::BarrierTimeout { .. } => "barrier_timeout",
            LaunchError::BarrierMismatch { .. } | LaunchError::Coordination(_) => "coordination",
            LaunchError::ProcessLaunch(_) => "process_launch",
            LaunchError::ProcessExitNonZero { .. } => "process_exit_non_zero",
            LaunchError::CaptureIo { .. } => "capture_io",
            LaunchError::IoError(_) | LaunchError::Other(_) => "unhandled",
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LaunchError>;
