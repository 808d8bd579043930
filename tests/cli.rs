// tests/cli.rs

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use graphlaunch::cli::{CliArgs, LogLevel};
use graphlaunch::logging::resolve_level;
use tracing::Level;

const POSITIONALS: [&str; 5] = ["zk:2181", "/opt/bin/TSC", "/in/graph", "tsv", "/out/tri"];

fn parse(flags: &[&str]) -> CliArgs {
    let argv = std::iter::once("graphlaunch")
        .chain(flags.iter().copied())
        .chain(POSITIONALS);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn positionals_and_defaults() {
    let args = parse(&[]);
    assert_eq!(args.instances, 1);
    assert_eq!(args.coordination, "zk:2181");
    assert_eq!(args.binary, PathBuf::from("/opt/bin/TSC"));
    assert_eq!(args.format, "tsv");
    assert_eq!(args.output, PathBuf::from("/out/tri"));
    assert!(!args.debug);
    assert_eq!(args.requested_log_level(), None);
}

#[test]
fn debug_flag_selects_debug_logging() {
    assert_eq!(parse(&["-d"]).requested_log_level(), Some(LogLevel::Debug));
    assert_eq!(parse(&["--debug", "-i", "3"]).instances, 3);

    // An explicit level wins over the shorthand.
    let args = parse(&["--debug", "--log-level", "warn"]);
    assert_eq!(args.requested_log_level(), Some(LogLevel::Warn));
}

#[test]
fn output_help_mentions_per_instance_paths() {
    let cmd = CliArgs::command();
    let output = cmd
        .get_arguments()
        .find(|a| a.get_id() == "output")
        .unwrap();
    let help = output
        .get_long_help()
        .or(output.get_help())
        .unwrap()
        .to_string();
    assert!(help.contains("<OUTPUT>-i"), "help: {help}");
}

#[test]
fn log_level_prefers_cli_then_env_then_info() {
    assert_eq!(resolve_level(Some(LogLevel::Trace), Some("error")), Level::TRACE);
    assert_eq!(resolve_level(None, Some(" Warning ")), Level::WARN);
    assert_eq!(resolve_level(None, Some("loud")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);

    let debug = parse(&["--debug"]).requested_log_level();
    assert_eq!(resolve_level(debug, Some("error")), Level::DEBUG);
}
