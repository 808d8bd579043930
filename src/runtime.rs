// src/runtime.rs

//! Single-machine stand-in for the cluster runtime.
//!
//! A [`LocalCluster`] plays the part the cluster scheduler plays in
//! production: it hands each of N instances its context and runs one
//! [`InstanceDriver`] per instance, all concurrently, sharing one in-process
//! [`LocalCoordinator`] as the coordination service. Drivers return control
//! here when they finish; nothing exits the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::classpath::ClasspathQuery;
use crate::config::{JobArguments, LaunchSettings};
use crate::coord::{CoordinationService, LocalCoordinator};
use crate::driver::{
    read_coordination_connect, DriverDeps, DriverReport, InstanceContext, InstanceDriver,
};
use crate::errors::{LaunchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging::{LogSink, TracingSink};
use crate::orchestrator::OutputRouting;

/// Fresh identifier for one coordinated run.
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Give every instance its own output path when the binary's stdout is
/// captured, since each instance would otherwise truncate the same file.
///
/// Self-writing binaries coordinate their own output and keep the shared
/// path; a single instance always keeps it unchanged. Each rewritten path
/// is logged at INFO.
pub fn per_instance_jobs(job: &JobArguments, instance_count: usize) -> Vec<JobArguments> {
    let capture = OutputRouting::from_binary(&job.binary_path) == OutputRouting::StdoutCaptureOutput;

    (0..instance_count)
        .map(|i| {
            if capture && instance_count > 1 {
                let mut job = job.clone();
                let mut name = job.output_path.clone().into_os_string();
                name.push(format!("-{i}"));
                job.output_path = PathBuf::from(name);
                info!(
                    instance_id = i,
                    output = %job.output_path.display(),
                    "captured output goes to a per-instance path"
                );
                job
            } else {
                job.clone()
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LocalCluster {
    settings: LaunchSettings,
    coordinator: Arc<dyn CoordinationService>,
    local_fs: Arc<dyn FileSystem>,
    durable_fs: Arc<dyn FileSystem>,
    classpath_query: ClasspathQuery,
    query_env: Vec<(String, String)>,
    coordination_connect: Option<String>,
    sink: Option<Arc<dyn LogSink>>,
}

impl LocalCluster {
    /// A cluster on the real filesystem with an in-process coordinator.
    pub fn new(settings: LaunchSettings, classpath_query: ClasspathQuery) -> Self {
        Self {
            settings,
            coordinator: Arc::new(LocalCoordinator::new()),
            local_fs: Arc::new(RealFileSystem),
            durable_fs: Arc::new(RealFileSystem),
            classpath_query,
            query_env: Vec::new(),
            coordination_connect: None,
            sink: None,
        }
    }

    pub fn with_coordinator(mut self, coordinator: Arc<dyn CoordinationService>) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn with_filesystems(mut self, local: Arc<dyn FileSystem>, durable: Arc<dyn FileSystem>) -> Self {
        self.local_fs = local;
        self.durable_fs = durable;
        self
    }

    pub fn with_query_env(mut self, env: Vec<(String, String)>) -> Self {
        self.query_env = env;
        self
    }

    /// Connection string handed to every instance. Without it, each instance
    /// reads `TWILL_ZK_CONNECT` from the process environment when it starts.
    pub fn with_coordination_connect(mut self, connect: impl Into<String>) -> Self {
        self.coordination_connect = Some(connect.into());
        self
    }

    /// Send every instance's records to one sink instead of per-instance
    /// `tracing` sinks.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run one driver per job, concurrently, and collect their results in
    /// instance order. The number of jobs is the instance count.
    pub async fn run(&self, run_id: &str, jobs: Vec<JobArguments>) -> Vec<Result<DriverReport>> {
        let instance_count = jobs.len();
        info!(run_id, instance_count, "starting coordinated run");

        let handles: Vec<_> = jobs
            .into_iter()
            .enumerate()
            .map(|(instance_id, job)| {
                let driver = self.driver(run_id, instance_id, instance_count, &job);
                tokio::spawn(driver.run())
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (instance_id, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(LaunchError::Other(anyhow!(
                    "instance {instance_id} driver task failed: {e}"
                ))),
            };
            match &result {
                Ok(report) if report.is_done() => {
                    info!(instance_id, exit_code = ?report.exit_code, "instance done")
                }
                Ok(report) => {
                    warn!(instance_id, error = ?report.error, "instance ended in error")
                }
                Err(e) => warn!(instance_id, error = %e, "instance failed"),
            }
            results.push(result);
        }
        results
    }

    fn driver(
        &self,
        run_id: &str,
        instance_id: usize,
        instance_count: usize,
        job: &JobArguments,
    ) -> InstanceDriver {
        let context = InstanceContext {
            instance_id,
            instance_count,
            run_id: run_id.to_string(),
            arguments: job.to_args(),
            coordination_connect: self
                .coordination_connect
                .clone()
                .or_else(read_coordination_connect),
        };
        let sink: Arc<dyn LogSink> = match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => Arc::new(TracingSink::new(instance_id)),
        };
        let deps = DriverDeps {
            coordinator: Arc::clone(&self.coordinator),
            local_fs: Arc::clone(&self.local_fs),
            durable_fs: Arc::clone(&self.durable_fs),
            sink,
            classpath_query: self.classpath_query.clone(),
            query_env: self.query_env.clone(),
        };
        InstanceDriver::new(context, self.settings.clone(), deps)
    }
}
