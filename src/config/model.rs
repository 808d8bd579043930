// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{LaunchError, Result};
use crate::types::FailurePolicy;

/// Job name exported to the child as `ZK_JOBNAME`.
pub const DEFAULT_JOB_NAME: &str = "graphLab-workers";

/// The four arguments every instance receives from the cluster runtime.
///
/// Built once per instance and never mutated. Only the cluster-runtime
/// boundary sees the flattened string form ([`JobArguments::to_args`] /
/// [`JobArguments::from_args`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArguments {
    /// Local path of the native graph binary.
    pub binary_path: PathBuf,
    /// Graph input on durable storage.
    pub input_path: PathBuf,
    /// Input format understood by the binary (e.g. "snap", "tsv").
    pub input_format: String,
    /// Output location on durable storage.
    pub output_path: PathBuf,
}

impl JobArguments {
    pub const ARG_COUNT: usize = 4;

    pub fn new(
        binary_path: impl Into<PathBuf>,
        input_path: impl Into<PathBuf>,
        input_format: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            binary_path: binary_path.into(),
            input_path: input_path.into(),
            input_format: input_format.into(),
            output_path: output_path.into(),
        }
    }

    /// Parse the injected argument list: `[binary, input, format, output]`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() != Self::ARG_COUNT {
            return Err(LaunchError::ConfigError(format!(
                "expected {} job arguments (binary, input, format, output), got {}",
                Self::ARG_COUNT,
                args.len()
            )));
        }

        let names = ["binary path", "input path", "input format", "output path"];
        for (name, value) in names.iter().zip(args) {
            if value.as_ref().trim().is_empty() {
                return Err(LaunchError::ConfigError(format!("{name} is empty")));
            }
        }

        Ok(Self::new(
            args[0].as_ref(),
            args[1].as_ref(),
            args[2].as_ref(),
            args[3].as_ref(),
        ))
    }

    /// Flatten for transfer to another process.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.binary_path.to_string_lossy().into_owned(),
            self.input_path.to_string_lossy().into_owned(),
            self.input_format.clone(),
            self.output_path.to_string_lossy().into_owned(),
        ]
    }
}

/// Settings file as read from TOML, before validation.
///
/// ```toml
/// [barrier]
/// timeout_secs = 60
///
/// [process]
/// job_name = "graphLab-workers"
/// exit_code_policy = "suppress"
/// classpath_command = "/opt/hadoop/bin/hadoop"
///
/// [driver]
/// drain_delay_ms = 1000
/// error_policy = "suppress"
/// ```
///
/// All sections are optional and have defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLaunchConfig {
    #[serde(default)]
    pub barrier: BarrierSection,
    #[serde(default)]
    pub process: ProcessSection,
    #[serde(default)]
    pub driver: DriverSection,
}

/// `[barrier]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BarrierSection {
    /// Bound on each of `enter` and `leave`.
    #[serde(default = "default_barrier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BarrierSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_barrier_timeout_secs(),
        }
    }
}

/// `[process]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessSection {
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// What a non-zero exit code of the binary does to the instance.
    #[serde(default)]
    pub exit_code_policy: FailurePolicy,

    /// Program used for the classpath query instead of `hadoop`.
    #[serde(default)]
    pub classpath_command: Option<String>,
}

impl Default for ProcessSection {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            exit_code_policy: FailurePolicy::default(),
            classpath_command: None,
        }
    }
}

/// `[driver]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverSection {
    /// Grace delay after leaving the barrier.
    #[serde(default = "default_drain_delay_ms")]
    pub drain_delay_ms: u64,

    /// What an error at the driver's top level does.
    #[serde(default)]
    pub error_policy: FailurePolicy,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            drain_delay_ms: default_drain_delay_ms(),
            error_policy: FailurePolicy::default(),
        }
    }
}

fn default_barrier_timeout_secs() -> u64 {
    60
}

fn default_drain_delay_ms() -> u64 {
    1000
}

fn default_job_name() -> String {
    DEFAULT_JOB_NAME.to_string()
}

/// Validated settings used by the driver and orchestrator.
///
/// Construct from a [`RawLaunchConfig`] via `TryFrom`, or use `default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub barrier_timeout: Duration,
    pub drain_delay: Duration,
    pub job_name: String,
    pub exit_code_policy: FailurePolicy,
    pub error_policy: FailurePolicy,
    pub classpath_command: Option<PathBuf>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            barrier_timeout: Duration::from_secs(default_barrier_timeout_secs()),
            drain_delay: Duration::from_millis(default_drain_delay_ms()),
            job_name: default_job_name(),
            exit_code_policy: FailurePolicy::default(),
            error_policy: FailurePolicy::default(),
            classpath_command: None,
        }
    }
}
