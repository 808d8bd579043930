// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{LaunchSettings, RawLaunchConfig};
use crate::errors::Result;

/// Load a settings file and return the raw `RawLaunchConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLaunchConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Deserialize settings from a TOML string.
pub fn parse_str(contents: &str) -> Result<RawLaunchConfig> {
    let config: RawLaunchConfig = toml::from_str(contents)?;
    Ok(config)
}

/// Load a settings file from path and validate it.
///
/// `None` yields the built-in defaults, so running without a settings file is
/// the normal case.
pub fn load_and_validate(path: Option<&Path>) -> Result<LaunchSettings> {
    match path {
        Some(path) => LaunchSettings::try_from(load_from_path(path)?),
        None => Ok(LaunchSettings::default()),
    }
}
