// src/driver/mod.rs

//! Per-instance control loop.
//!
//! One [`InstanceDriver`] runs on every node. It validates its job, waits at
//! the run's barrier for all peers, runs the graph binary, then waits at the
//! barrier again before reporting completion. See [`DriverState`] for the
//! state machine.

pub mod state;

use std::sync::Arc;

use tracing::{debug, Level};

use crate::classpath::{ClasspathQuery, ClasspathResolver};
use crate::config::{JobArguments, LaunchSettings};
use crate::coord::{BarrierHandle, CoordinationService};
use crate::errors::{LaunchError, Result};
use crate::fs::FileSystem;
use crate::logging::{LogRecord, LogSink};
use crate::orchestrator::{validate_launch, ProcessOrchestrator};
use crate::types::FailurePolicy;

pub use state::DriverState;

/// Environment variable holding the coordination service connection string.
pub const COORDINATION_ENV: &str = "TWILL_ZK_CONNECT";

/// Read the coordination connection string from the process environment.
pub fn read_coordination_connect() -> Option<String> {
    std::env::var(COORDINATION_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// What the cluster runtime hands to one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceContext {
    pub instance_id: usize,
    pub instance_count: usize,
    pub run_id: String,
    /// Flattened [`JobArguments`].
    pub arguments: Vec<String>,
    /// Coordination connection string, read once when the instance starts.
    pub coordination_connect: Option<String>,
}

/// Collaborators injected into a driver.
#[derive(Debug, Clone)]
pub struct DriverDeps {
    pub coordinator: Arc<dyn CoordinationService>,
    /// Node-local filesystem: binary checks and classpath listings.
    pub local_fs: Arc<dyn FileSystem>,
    /// Durable storage: input checks and captured output.
    pub durable_fs: Arc<dyn FileSystem>,
    pub sink: Arc<dyn LogSink>,
    pub classpath_query: ClasspathQuery,
    /// Environment the classpath query starts from.
    pub query_env: Vec<(String, String)>,
}

/// Summary of one driver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverReport {
    pub instance_id: usize,
    /// Every state visited, in order, ending with `Done` or `Error`.
    pub states: Vec<DriverState>,
    /// Exit code of the graph binary, if it ran and exited normally.
    pub exit_code: Option<i32>,
    /// Contained failure, if the run ended in `Error`.
    pub error: Option<String>,
}

impl DriverReport {
    pub fn final_state(&self) -> DriverState {
        self.states.last().copied().unwrap_or(DriverState::Init)
    }

    pub fn is_done(&self) -> bool {
        self.final_state() == DriverState::Done
    }

    pub fn visited(&self, state: DriverState) -> bool {
        self.states.contains(&state)
    }
}

/// Records state transitions and mirrors them to the sink.
struct Transitions {
    states: Vec<DriverState>,
    sink: Arc<dyn LogSink>,
}

impl Transitions {
    fn new(sink: Arc<dyn LogSink>) -> Self {
        let transitions = Self {
            states: vec![DriverState::Init],
            sink,
        };
        transitions.sink.record(LogRecord::event(Level::DEBUG, "state: init"));
        transitions
    }

    fn current(&self) -> DriverState {
        self.states.last().copied().unwrap_or(DriverState::Init)
    }

    fn advance(&mut self, next: DriverState) {
        let from = self.current();
        debug_assert!(from.can_advance_to(next), "illegal transition {from} -> {next}");
        debug!(%from, to = %next, "driver transition");
        self.sink
            .record(LogRecord::event(Level::DEBUG, format!("state: {next}")));
        self.states.push(next);
    }
}

/// Validated inputs of one run, produced by `Init`.
struct Prepared {
    job: JobArguments,
    zk_servers: String,
    barrier: BarrierHandle,
}

pub struct InstanceDriver {
    context: InstanceContext,
    settings: LaunchSettings,
    deps: DriverDeps,
}

impl InstanceDriver {
    pub fn new(context: InstanceContext, settings: LaunchSettings, deps: DriverDeps) -> Self {
        Self {
            context,
            settings,
            deps,
        }
    }

    /// Run the instance to a terminal state.
    ///
    /// Under `FailurePolicy::Suppress` (the default) this always returns
    /// `Ok`; a failure is logged and reported in [`DriverReport::error`] and
    /// the final state is `Error`. Under `Propagate` the failure is returned.
    pub async fn run(self) -> Result<DriverReport> {
        let mut transitions = Transitions::new(Arc::clone(&self.deps.sink));

        match self.drive(&mut transitions).await {
            Ok(exit_code) => {
                transitions.advance(DriverState::Done);
                self.log(Level::INFO, "instance finished");
                Ok(DriverReport {
                    instance_id: self.context.instance_id,
                    states: transitions.states,
                    exit_code,
                    error: None,
                })
            }
            Err(Failure { error, exit_code }) => {
                transitions.advance(DriverState::Error);
                self.log(
                    Level::ERROR,
                    &format!("instance failed ({}): {error}", error.kind()),
                );
                match self.settings.error_policy {
                    FailurePolicy::Propagate => Err(error),
                    FailurePolicy::Suppress => Ok(DriverReport {
                        instance_id: self.context.instance_id,
                        states: transitions.states,
                        exit_code,
                        error: Some(error.to_string()),
                    }),
                }
            }
        }
    }

    async fn drive(&self, transitions: &mut Transitions) -> std::result::Result<Option<i32>, Failure> {
        let prepared = self.prepare().map_err(Failure::from)?;
        let timeout = self.settings.barrier_timeout;
        let coordinator = &self.deps.coordinator;

        transitions.advance(DriverState::EnteringBarrier);
        self.log(
            Level::DEBUG,
            &format!(
                "entering barrier {} with {} parties",
                prepared.barrier.id(),
                prepared.barrier.party_count()
            ),
        );
        coordinator
            .enter(&prepared.barrier, timeout)
            .await
            .map_err(Failure::from)?;

        transitions.advance(DriverState::Running);
        let running = self
            .orchestrator()
            .launch(&prepared.job, self.context.instance_count, &prepared.zk_servers)
            .await;
        if let Err(e) = &running {
            self.log(Level::ERROR, &format!("graph process failed: {e}"));
        }

        // Leave whatever happened above, so peers are not stranded.
        transitions.advance(DriverState::LeavingBarrier);
        if let Err(e) = coordinator.leave(&prepared.barrier, timeout).await {
            self.log(Level::WARN, &format!("leaving barrier failed: {e}"));
        }

        transitions.advance(DriverState::Draining);
        tokio::time::sleep(self.settings.drain_delay).await;

        let outcome = running.map_err(Failure::from)?;
        Ok(outcome.exit_code)
    }

    /// `Init`: everything that can be checked without touching peers.
    fn prepare(&self) -> Result<Prepared> {
        let job = JobArguments::from_args(&self.context.arguments)?;

        let zk_servers = self.context.coordination_connect.clone().ok_or_else(|| {
            LaunchError::ConfigError(format!("{COORDINATION_ENV} is not set"))
        })?;

        validate_launch(
            &job,
            self.deps.local_fs.as_ref(),
            self.deps.durable_fs.as_ref(),
        )?;

        let barrier = BarrierHandle::for_run(&self.context.run_id, self.context.instance_count)?;

        Ok(Prepared {
            job,
            zk_servers,
            barrier,
        })
    }

    fn orchestrator(&self) -> ProcessOrchestrator {
        let resolver = ClasspathResolver::new(
            self.deps.classpath_query.clone(),
            Arc::clone(&self.deps.local_fs),
        );
        ProcessOrchestrator::new(
            resolver,
            Arc::clone(&self.deps.durable_fs),
            Arc::clone(&self.deps.sink),
            self.settings.job_name.clone(),
            self.settings.exit_code_policy,
        )
        .with_query_env(self.deps.query_env.clone())
    }

    fn log(&self, level: Level, message: &str) {
        self.deps.sink.record(LogRecord::event(
            level,
            format!("[instance {}] {message}", self.context.instance_id),
        ));
    }
}

/// A failed run plus whatever was learned before it failed.
struct Failure {
    error: LaunchError,
    exit_code: Option<i32>,
}

impl From<LaunchError> for Failure {
    fn from(error: LaunchError) -> Self {
        let exit_code = match &error {
            LaunchError::ProcessExitNonZero { code } => Some(*code),
            _ => None,
        };
        Self { error, exit_code }
    }
}
