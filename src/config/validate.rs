// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{LaunchSettings, RawLaunchConfig};
use crate::errors::{LaunchError, Result};

impl TryFrom<RawLaunchConfig> for LaunchSettings {
    type Error = LaunchError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(LaunchSettings {
            barrier_timeout: Duration::from_secs(raw.barrier.timeout_secs),
            drain_delay: Duration::from_millis(raw.driver.drain_delay_ms),
            job_name: raw.process.job_name.trim().to_string(),
            exit_code_policy: raw.process.exit_code_policy,
            error_policy: raw.driver.error_policy,
            classpath_command: raw.process.classpath_command.map(PathBuf::from),
        })
    }
}

fn validate_raw_config(cfg: &RawLaunchConfig) -> Result<()> {
    validate_barrier(cfg)?;
    validate_process(cfg)?;
    Ok(())
}

fn validate_barrier(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.barrier.timeout_secs == 0 {
        return Err(LaunchError::ConfigError(
            "[barrier].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_process(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.process.job_name.trim().is_empty() {
        return Err(LaunchError::ConfigError(
            "[process].job_name must not be empty".to_string(),
        ));
    }
    if let Some(cmd) = &cfg.process.classpath_command {
        if cmd.trim().is_empty() {
            return Err(LaunchError::ConfigError(
                "[process].classpath_command must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}
