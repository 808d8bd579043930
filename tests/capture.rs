// tests/capture.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use graphlaunch::capture::{capture_streams, CapturePlan, CapturePolicy};
use graphlaunch::errors::LaunchError;
use graphlaunch::fs::mock::MockFileSystem;
use graphlaunch::logging::MemorySink;
use graphlaunch::types::StreamTag;

fn reader(bytes: &[u8]) -> Cursor<Vec<u8>> {
    Cursor::new(bytes.to_vec())
}

#[tokio::test]
async fn each_line_becomes_one_record_tagged_with_its_stream() {
    init_tracing();

    let sink = MemorySink::new();
    let report = with_timeout(capture_streams(
        reader(b"first\nsecond\r\nno newline"),
        reader(b"oops\n"),
        &CapturePlan::separate(),
        Arc::new(MockFileSystem::new()),
        Arc::new(sink.clone()),
    ))
    .await
    .unwrap();

    assert_eq!(
        sink.lines(StreamTag::Stdout),
        vec!["first", "second", "no newline"]
    );
    assert_eq!(sink.lines(StreamTag::Stderr), vec!["oops"]);
    assert_eq!(report.stdout.lines, 3);
    assert_eq!(report.stderr.lines, 1);
    assert_eq!(report.stdout.bytes, 24);
}

#[tokio::test]
async fn invalid_utf8_is_decoded_lossily() {
    let sink = MemorySink::new();
    capture_streams(
        reader(b"ok\xffbad\n"),
        reader(b""),
        &CapturePlan::separate(),
        Arc::new(MockFileSystem::new()),
        Arc::new(sink.clone()),
    )
    .await
    .unwrap();

    assert_eq!(sink.lines(StreamTag::Stdout), vec!["ok\u{FFFD}bad"]);
}

#[tokio::test]
async fn merged_plan_logs_stderr_under_the_stdout_tag() {
    let sink = MemorySink::new();
    capture_streams(
        reader(b"out\n"),
        reader(b"err\n"),
        &CapturePlan::merged(),
        Arc::new(MockFileSystem::new()),
        Arc::new(sink.clone()),
    )
    .await
    .unwrap();

    let mut lines = sink.lines(StreamTag::Stdout);
    lines.sort();
    assert_eq!(lines, vec!["err", "out"]);
    assert!(sink.lines(StreamTag::Stderr).is_empty());
}

#[tokio::test]
async fn durable_stdout_is_copied_byte_for_byte_and_truncates() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/out/result", b"stale content from an earlier run".to_vec());

    let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let sink = MemorySink::new();

    let report = with_timeout(capture_streams(
        Cursor::new(payload.clone()),
        reader(b"progress 1\nprogress 2\n"),
        &CapturePlan::stdout_to("/out/result"),
        Arc::new(fs.clone()),
        Arc::new(sink.clone()),
    ))
    .await
    .unwrap();

    assert_eq!(fs.contents("/out/result").unwrap(), payload);
    assert_eq!(report.stdout.bytes, payload.len() as u64);
    assert_eq!(
        sink.lines(StreamTag::Stderr),
        vec!["progress 1", "progress 2"]
    );
    assert!(sink.lines(StreamTag::Stdout).is_empty());
}

#[tokio::test]
async fn empty_durable_stream_still_creates_an_empty_file() {
    let fs = MockFileSystem::new();
    capture_streams(
        reader(b""),
        reader(b""),
        &CapturePlan::stdout_to("/out/empty"),
        Arc::new(fs.clone()),
        Arc::new(MemorySink::new()),
    )
    .await
    .unwrap();

    assert_eq!(fs.contents("/out/empty").unwrap(), Vec::<u8>::new());
}

#[tokio::test]
async fn both_streams_durable_is_rejected() {
    let plan = CapturePlan {
        stdout: CapturePolicy::Durable(PathBuf::from("/a")),
        stderr: CapturePolicy::Durable(PathBuf::from("/b")),
    };
    assert!(matches!(plan.validate(), Err(LaunchError::ConfigError(_))));

    let res = capture_streams(
        reader(b"x\n"),
        reader(b"y\n"),
        &plan,
        Arc::new(MockFileSystem::new()),
        Arc::new(MemorySink::new()),
    )
    .await;
    assert!(matches!(res, Err(LaunchError::ConfigError(_))), "got {res:?}");
}

#[tokio::test]
async fn sink_failure_is_reported_after_the_other_stream_is_drained() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.fail_writes("/out/result");
    let sink = MemorySink::new();

    let res = with_timeout(capture_streams(
        reader(b"result line\n"),
        reader(b"e1\ne2\ne3\n"),
        &CapturePlan::stdout_to("/out/result"),
        Arc::new(fs),
        Arc::new(sink.clone()),
    ))
    .await;

    match res {
        Err(LaunchError::CaptureIo { stream, .. }) => assert_eq!(stream, "stdout"),
        other => panic!("expected CaptureIo, got {other:?}"),
    }
    assert_eq!(sink.lines(StreamTag::Stderr), vec!["e1", "e2", "e3"]);
}

#[tokio::test]
async fn durable_target_that_cannot_be_created_is_an_error() {
    let fs = MockFileSystem::new();
    fs.add_dir("/out/taken");

    let res = capture_streams(
        reader(b"data\n"),
        reader(b""),
        &CapturePlan::stdout_to("/out/taken"),
        Arc::new(fs),
        Arc::new(MemorySink::new()),
    )
    .await;

    assert!(
        matches!(res, Err(LaunchError::CaptureIo { stream: "stdout", .. })),
        "got {res:?}"
    );
}
