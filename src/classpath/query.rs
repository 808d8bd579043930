// src/classpath/query.rs

//! The external `hadoop classpath` query.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn, Level};

use crate::capture::strip_line_ending;
use crate::errors::{LaunchError, Result};
use crate::logging::{LogRecord, LogSink};

/// Node-manager-private configuration directory; never handed to the query.
pub const HADOOP_CONF_DIR: &str = "HADOOP_CONF_DIR";
/// Client configuration directory, used as `HADOOP_CONF_DIR` when present.
pub const HADOOP_CLIENT_CONF_DIR: &str = "HADOOP_CLIENT_CONF_DIR";
/// Install root used to locate the `hadoop` executable.
pub const HADOOP_COMMON_HOME: &str = "HADOOP_COMMON_HOME";

/// Command that prints a delimited classpath listing on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathQuery {
    program: PathBuf,
    args: Vec<String>,
}

impl ClasspathQuery {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `hadoop classpath`, located through `HADOOP_COMMON_HOME` if it is set
    /// in `vars`, unless `program_override` names another executable.
    pub fn hadoop<'a>(
        vars: impl IntoIterator<Item = (&'a str, &'a str)>,
        program_override: Option<&Path>,
    ) -> Self {
        let program = match program_override {
            Some(program) => program.to_path_buf(),
            None => vars
                .into_iter()
                .find(|(k, _)| *k == HADOOP_COMMON_HOME)
                .map(|(_, home)| Path::new(home).join("bin").join("hadoop"))
                .unwrap_or_else(|| PathBuf::from("hadoop")),
        };
        Self::new(program, vec!["classpath".to_string()])
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the query with `base_env` (after [`sanitize_env`]) and return its
    /// stdout. Stderr lines go to `sink`.
    ///
    /// Only failing to start the program is an error; a non-zero exit is
    /// logged and whatever was printed is still returned.
    pub async fn run(&self, base_env: Vec<(String, String)>, sink: Arc<dyn LogSink>) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env_clear()
            .envs(sanitize_env(base_env))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            LaunchError::ProcessLaunch(format!(
                "starting classpath query {:?}: {e}",
                self.program
            ))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let read_stdout = async {
            let mut out = Vec::new();
            if let Some(mut stdout) = stdout {
                stdout.read_to_end(&mut out).await?;
            }
            Ok::<_, std::io::Error>(out)
        };

        // Stderr is drained to EOF; invalid UTF-8 is decoded lossily.
        let log_stderr = async {
            let Some(stderr) = stderr else {
                return;
            };
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(strip_line_ending(&buf));
                        sink.record(LogRecord::event(
                            Level::WARN,
                            format!("classpath query: {line}"),
                        ));
                    }
                    Err(e) => {
                        warn!(program = ?self.program, error = %e, "reading classpath query stderr failed");
                        sink.record(LogRecord::event(
                            Level::WARN,
                            format!("classpath query: stderr unreadable: {e}"),
                        ));
                        break;
                    }
                }
            }
        };

        let (out, ()) = tokio::join!(read_stdout, log_stderr);
        let out = out.context("reading classpath query output")?;

        let status = child.wait().await.context("waiting for classpath query")?;
        if !status.success() {
            warn!(program = ?self.program, code = ?status.code(), "classpath query exited unsuccessfully");
        }

        let listing = String::from_utf8_lossy(&out).into_owned();
        debug!(%listing, "raw classpath");
        Ok(listing)
    }
}

/// Strip the node-local `HADOOP_CONF_DIR` and, if a client configuration
/// directory is available, put it in its place.
pub fn sanitize_env(vars: impl IntoIterator<Item = (String, String)>) -> Vec<(String, String)> {
    let mut env: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(k, _)| k != HADOOP_CONF_DIR)
        .collect();

    let client_conf = env
        .iter()
        .find(|(k, _)| k == HADOOP_CLIENT_CONF_DIR)
        .map(|(_, v)| v.clone());

    if let Some(dir) = client_conf {
        env.push((HADOOP_CONF_DIR.to_string(), dir));
    }
    env
}
