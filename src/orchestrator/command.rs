// src/orchestrator/command.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::variant::OutputRouting;
use crate::capture::CapturePlan;
use crate::config::JobArguments;
use crate::errors::{LaunchError, Result};
use crate::fs::FileSystem;

/// Everything needed to start the binary: program, arguments, the complete
/// environment, and the output routing that shaped them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, String)>,
    pub routing: OutputRouting,
    pub capture: CapturePlan,
}

impl LaunchSpec {
    /// Program followed by its arguments, lossily converted for display and
    /// assertions.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Build `[binary, --graph, input, --format, format, <variant suffix>]`.
pub fn build_launch(job: &JobArguments, env: Vec<(String, String)>) -> LaunchSpec {
    let routing = OutputRouting::from_binary(&job.binary_path);

    let mut args: Vec<OsString> = vec![
        "--graph".into(),
        job.input_path.as_os_str().to_os_string(),
        "--format".into(),
        OsString::from(&job.input_format),
    ];
    args.extend(routing.output_args(&job.output_path));

    LaunchSpec {
        program: job.binary_path.clone(),
        args,
        env,
        routing,
        capture: routing.capture_plan(&job.output_path),
    }
}

/// Checks done before entering the barrier, so an instance that cannot run
/// never holds its peers up.
///
/// - the binary exists locally and is executable,
/// - the input exists on durable storage.
pub fn validate_launch(
    job: &JobArguments,
    local: &dyn FileSystem,
    durable: &dyn FileSystem,
) -> Result<()> {
    check_binary(&job.binary_path, local)?;

    if !durable.exists(&job.input_path) {
        return Err(LaunchError::ConfigError(format!(
            "input path {:?} does not exist",
            job.input_path
        )));
    }
    Ok(())
}

fn check_binary(binary: &Path, local: &dyn FileSystem) -> Result<()> {
    if !local.exists(binary) {
        return Err(LaunchError::ProcessLaunch(format!(
            "binary {:?} does not exist",
            binary
        )));
    }
    if !local.is_file(binary) || !local.is_executable(binary) {
        return Err(LaunchError::ProcessLaunch(format!(
            "binary {:?} is not an executable file",
            binary
        )));
    }
    Ok(())
}
