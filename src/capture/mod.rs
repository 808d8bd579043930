// src/capture/mod.rs

//! Stream capture pipeline.
//!
//! While the child runs, its stdout and stderr are drained by exactly two
//! Tokio tasks, one per stream. Each task either forwards lines to the
//! [`LogSink`] or copies bytes verbatim to a file on durable storage.
//! [`capture_streams`] only returns once both tasks have seen end-of-stream;
//! an error from either task is reported after that, never dropped.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::errors::{LaunchError, Result};
use crate::fs::FileSystem;
use crate::logging::{LogRecord, LogSink};
use crate::types::StreamTag;

const COPY_BUF_SIZE: usize = 8 * 1024;

/// Where one stream goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturePolicy {
    /// One log record per line, tagged with the given stream.
    Log(StreamTag),
    /// Byte-exact copy into a create-or-truncate file on durable storage.
    Durable(PathBuf),
}

/// Policies for both streams of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePlan {
    pub stdout: CapturePolicy,
    pub stderr: CapturePolicy,
}

impl CapturePlan {
    /// Both streams logged as one interleaved stdout log.
    pub fn merged() -> Self {
        Self {
            stdout: CapturePolicy::Log(StreamTag::Stdout),
            stderr: CapturePolicy::Log(StreamTag::Stdout),
        }
    }

    /// Both streams logged, each under its own tag.
    pub fn separate() -> Self {
        Self {
            stdout: CapturePolicy::Log(StreamTag::Stdout),
            stderr: CapturePolicy::Log(StreamTag::Stderr),
        }
    }

    /// Stdout written verbatim to `path`; stderr logged separately.
    pub fn stdout_to(path: impl Into<PathBuf>) -> Self {
        Self {
            stdout: CapturePolicy::Durable(path.into()),
            stderr: CapturePolicy::Log(StreamTag::Stderr),
        }
    }

    /// At most one stream may use the durable policy.
    pub fn validate(&self) -> Result<()> {
        if let (CapturePolicy::Durable(a), CapturePolicy::Durable(b)) = (&self.stdout, &self.stderr) {
            return Err(LaunchError::ConfigError(format!(
                "both streams routed to durable storage ({:?}, {:?}); at most one is allowed",
                a, b
            )));
        }
        Ok(())
    }
}

/// What one capture task saw before end-of-stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub bytes: u64,
    pub lines: u64,
}

/// Result of a completed capture: both streams reached end-of-stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureReport {
    pub stdout: StreamSummary,
    pub stderr: StreamSummary,
}

/// Drain both streams concurrently according to `plan`.
pub async fn capture_streams<O, E>(
    stdout: O,
    stderr: E,
    plan: &CapturePlan,
    durable: Arc<dyn FileSystem>,
    sink: Arc<dyn LogSink>,
) -> Result<CaptureReport>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    plan.validate()?;

    let stdout_task = tokio::spawn(drain(
        stdout,
        plan.stdout.clone(),
        Arc::clone(&durable),
        Arc::clone(&sink),
    ));
    let stderr_task = tokio::spawn(drain(stderr, plan.stderr.clone(), durable, sink));

    // Both tasks are awaited before either result is inspected.
    let (stdout_res, stderr_res) = tokio::join!(stdout_task, stderr_task);
    debug!("both capture tasks reached end-of-stream");

    let stdout = settle(StreamTag::Stdout, stdout_res);
    let stderr = settle(StreamTag::Stderr, stderr_res);

    Ok(CaptureReport {
        stdout: stdout?,
        stderr: stderr?,
    })
}

fn settle(
    tag: StreamTag,
    joined: std::result::Result<io::Result<StreamSummary>, JoinError>,
) -> Result<StreamSummary> {
    match joined {
        Ok(Ok(summary)) => Ok(summary),
        Ok(Err(source)) => Err(LaunchError::CaptureIo {
            stream: tag.as_str(),
            source,
        }),
        Err(join_err) => Err(LaunchError::CaptureIo {
            stream: tag.as_str(),
            source: io::Error::other(format!("capture task aborted: {join_err}")),
        }),
    }
}

async fn drain<R>(
    reader: R,
    policy: CapturePolicy,
    durable: Arc<dyn FileSystem>,
    sink: Arc<dyn LogSink>,
) -> io::Result<StreamSummary>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    match policy {
        CapturePolicy::Log(tag) => drain_to_log(reader, tag, sink.as_ref()).await,
        CapturePolicy::Durable(path) => drain_to_durable(reader, &path, durable.as_ref()).await,
    }
}

async fn drain_to_log<R>(reader: R, tag: StreamTag, sink: &dyn LogSink) -> io::Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut summary = StreamSummary::default();

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            break;
        }
        summary.bytes += n as u64;
        summary.lines += 1;
        let line = String::from_utf8_lossy(strip_line_ending(&buf));
        sink.record(LogRecord::line(tag, line));
    }

    Ok(summary)
}

/// Copy `reader` into `path`. If the sink fails, the rest of the stream is
/// still read (and discarded) so the child never blocks on a full pipe; the
/// first failure is returned at end-of-stream.
async fn drain_to_durable<R>(mut reader: R, path: &Path, fs: &dyn FileSystem) -> io::Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    let mut summary = StreamSummary::default();

    let mut writer = match fs.create(path) {
        Ok(writer) => Some(writer),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot open durable sink; discarding stream");
            let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
            summary.bytes = discarded;
            return Err(io::Error::other(format!("{e:#}")));
        }
    };

    let mut failure: Option<io::Error> = None;
    let mut buf = vec![0u8; COPY_BUF_SIZE];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let chunk = &buf[..n];
        summary.bytes += n as u64;
        summary.lines += chunk.iter().filter(|b| **b == b'\n').count() as u64;

        if let Some(w) = writer.as_mut() {
            if let Err(e) = w.write_all(chunk).await {
                warn!(path = %path.display(), error = %e, "durable sink write failed; discarding rest of stream");
                failure = Some(e);
                writer = None;
            }
        }
    }

    if let Some(mut w) = writer {
        if let Err(e) = w.shutdown().await {
            failure.get_or_insert(e);
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}

/// Drop one trailing `\n` and then one trailing `\r`, if present.
pub(crate) fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
