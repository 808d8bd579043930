// src/orchestrator/mod.rs

//! Process orchestration.
//!
//! Turns [`JobArguments`] into a running child process and supervises it:
//!
//! - [`variant`] picks the [`OutputRouting`] from the binary's file name.
//! - [`command`] builds the argv/environment ([`LaunchSpec`]) and performs the
//!   pre-barrier launch checks.
//! - [`ProcessOrchestrator`] resolves the classpath, spawns the child, and
//!   waits for it and for both capture tasks.

pub mod command;
pub mod variant;

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, info, Level};

use crate::capture::{capture_streams, CaptureReport};
use crate::classpath::ClasspathResolver;
use crate::config::JobArguments;
use crate::env::{build_child_env, ChildEnvParams};
use crate::errors::{LaunchError, Result};
use crate::fs::FileSystem;
use crate::logging::{LogRecord, LogSink};
use crate::types::FailurePolicy;

pub use command::{build_launch, validate_launch, LaunchSpec};
pub use variant::OutputRouting;

/// What happened to one launched child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` if the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub routing: OutputRouting,
    pub capture: CaptureReport,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launches the graph binary for one instance.
#[derive(Debug, Clone)]
pub struct ProcessOrchestrator {
    classpath: ClasspathResolver,
    durable: Arc<dyn FileSystem>,
    sink: Arc<dyn LogSink>,
    job_name: String,
    exit_code_policy: FailurePolicy,
    query_env: Vec<(String, String)>,
}

impl ProcessOrchestrator {
    pub fn new(
        classpath: ClasspathResolver,
        durable: Arc<dyn FileSystem>,
        sink: Arc<dyn LogSink>,
        job_name: impl Into<String>,
        exit_code_policy: FailurePolicy,
    ) -> Self {
        Self {
            classpath,
            durable,
            sink,
            job_name: job_name.into(),
            exit_code_policy,
            query_env: Vec::new(),
        }
    }

    /// Environment the classpath query starts from (before sanitizing).
    pub fn with_query_env(mut self, env: Vec<(String, String)>) -> Self {
        self.query_env = env;
        self
    }

    /// Resolve the classpath, build the child environment and command line,
    /// then run the binary to completion.
    pub async fn launch(
        &self,
        job: &JobArguments,
        instance_count: usize,
        zk_servers: &str,
    ) -> Result<ProcessOutcome> {
        let classpath = self
            .classpath
            .resolve(self.query_env.clone(), Arc::clone(&self.sink))
            .await?;

        let env = build_child_env(&ChildEnvParams {
            classpath: &classpath,
            zk_servers,
            job_name: &self.job_name,
            instance_count,
        });

        let spec = build_launch(job, env);
        self.run(&spec).await
    }

    /// Spawn `spec` and block until the child has exited and both capture
    /// tasks have reached end-of-stream.
    pub async fn run(&self, spec: &LaunchSpec) -> Result<ProcessOutcome> {
        info!(argv = ?spec.argv(), routing = ?spec.routing, "starting graph process");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env_clear()
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            LaunchError::ProcessLaunch(format!("spawning {:?}: {e}", spec.program))
        })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(LaunchError::ProcessLaunch(
                "child output streams were not piped".to_string(),
            ));
        };

        let capture = capture_streams(
            stdout,
            stderr,
            &spec.capture,
            Arc::clone(&self.durable),
            Arc::clone(&self.sink),
        );
        let (status, capture) = tokio::join!(child.wait(), capture);

        let status = status.map_err(|e| {
            LaunchError::ProcessLaunch(format!("waiting for {:?}: {e}", spec.program))
        })?;
        let exit_code = status.code();
        debug!(?exit_code, "graph process exited");

        self.sink.record(LogRecord::event(
            if status.success() { Level::INFO } else { Level::WARN },
            match exit_code {
                Some(code) => format!("graph process exited with code {code}"),
                None => "graph process terminated by signal".to_string(),
            },
        ));

        let capture = capture?;

        if !status.success() && self.exit_code_policy == FailurePolicy::Propagate {
            return Err(LaunchError::ProcessExitNonZero {
                code: exit_code.unwrap_or(-1),
            });
        }

        Ok(ProcessOutcome {
            exit_code,
            routing: spec.routing,
            capture,
        })
    }
}
