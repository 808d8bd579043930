// src/config/mod.rs

//! Typed launch configuration.
//!
//! - [`model`] holds [`JobArguments`] (the per-instance job description) and
//!   the settings file structures.
//! - [`loader`] reads and parses the optional TOML settings file.
//! - [`validate`] turns a [`RawLaunchConfig`] into [`LaunchSettings`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{
    BarrierSection, DriverSection, JobArguments, LaunchSettings, ProcessSection,
    RawLaunchConfig, DEFAULT_JOB_NAME,
};
