// tests/config.rs

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use graphlaunch::config::{load_and_validate, parse_str, JobArguments, LaunchSettings};
use graphlaunch::errors::LaunchError;
use graphlaunch::types::FailurePolicy;

#[test]
fn empty_file_yields_the_defaults() {
    let raw = parse_str("").unwrap();
    let settings = LaunchSettings::try_from(raw).unwrap();

    assert_eq!(settings, LaunchSettings::default());
    assert_eq!(settings.barrier_timeout, Duration::from_secs(60));
    assert_eq!(settings.drain_delay, Duration::from_secs(1));
    assert_eq!(settings.job_name, "graphLab-workers");
    assert_eq!(settings.exit_code_policy, FailurePolicy::Suppress);
    assert_eq!(settings.error_policy, FailurePolicy::Suppress);
    assert!(settings.classpath_command.is_none());
}

#[test]
fn every_section_can_be_overridden() {
    let raw = parse_str(
        r#"
[barrier]
timeout_secs = 5

[process]
job_name = "coloring"
exit_code_policy = "propagate"
classpath_command = "/opt/hadoop/bin/hadoop"

[driver]
drain_delay_ms = 0
error_policy = "propagate"
"#,
    )
    .unwrap();
    let settings = LaunchSettings::try_from(raw).unwrap();

    assert_eq!(settings.barrier_timeout, Duration::from_secs(5));
    assert_eq!(settings.drain_delay, Duration::ZERO);
    assert_eq!(settings.job_name, "coloring");
    assert_eq!(settings.exit_code_policy, FailurePolicy::Propagate);
    assert_eq!(settings.error_policy, FailurePolicy::Propagate);
    assert_eq!(
        settings.classpath_command,
        Some(PathBuf::from("/opt/hadoop/bin/hadoop"))
    );
}

#[test]
fn unknown_policy_is_a_parse_error() {
    let res = parse_str("[driver]\nerror_policy = \"ignore\"\n");
    assert!(matches!(res, Err(LaunchError::TomlError(_))), "got {res:?}");
}

#[test]
fn invalid_values_are_rejected_by_validation() {
    for toml in [
        "[barrier]\ntimeout_secs = 0\n",
        "[process]\njob_name = \"  \"\n",
        "[process]\nclasspath_command = \"\"\n",
    ] {
        let raw = parse_str(toml).unwrap();
        let res = LaunchSettings::try_from(raw);
        assert!(
            matches!(res, Err(LaunchError::ConfigError(_))),
            "{toml:?}: got {res:?}"
        );
    }
}

#[test]
fn settings_file_is_read_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[barrier]\ntimeout_secs = 2").unwrap();

    let settings = load_and_validate(Some(file.path())).unwrap();
    assert_eq!(settings.barrier_timeout, Duration::from_secs(2));

    assert_eq!(load_and_validate(None).unwrap(), LaunchSettings::default());

    let res = load_and_validate(Some(file.path().with_extension("missing").as_path()));
    assert!(matches!(res, Err(LaunchError::IoError(_))), "got {res:?}");
}

#[test]
fn job_arguments_survive_the_flattened_form() {
    let job = JobArguments::new("/opt/bin/TSC", "/in/graph", "tsv", "/out/tri");
    let args = job.to_args();
    assert_eq!(args, vec!["/opt/bin/TSC", "/in/graph", "tsv", "/out/tri"]);
    assert_eq!(JobArguments::from_args(&args).unwrap(), job);
}

#[test]
fn job_arguments_need_four_non_empty_values() {
    let short = JobArguments::from_args(&["/bin/TSC", "/in", "tsv"]);
    assert!(matches!(short, Err(LaunchError::ConfigError(_))));

    let long = JobArguments::from_args(&["/bin/TSC", "/in", "tsv", "/out", "extra"]);
    assert!(matches!(long, Err(LaunchError::ConfigError(_))));

    match JobArguments::from_args(&["/bin/TSC", "/in", " ", "/out"]) {
        Err(LaunchError::ConfigError(msg)) => assert!(msg.contains("input format"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn failure_policy_parses_case_insensitively() {
    assert_eq!(FailurePolicy::from_str("Propagate"), Ok(FailurePolicy::Propagate));
    assert_eq!(FailurePolicy::from_str(" suppress "), Ok(FailurePolicy::Suppress));
    assert!(FailurePolicy::from_str("retry").is_err());
    assert_eq!(FailurePolicy::default(), FailurePolicy::Suppress);
}
