// src/lib.rs

pub mod capture;
pub mod classpath;
pub mod cli;
pub mod config;
pub mod coord;
pub mod driver;
pub mod env;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod orchestrator;
pub mod runtime;
pub mod types;

use anyhow::{bail, Result};
use tracing::info;

use crate::classpath::ClasspathQuery;
use crate::cli::CliArgs;
use crate::config::{load_and_validate, JobArguments};
use crate::runtime::{new_run_id, per_instance_jobs, LocalCluster};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - job arguments
/// - the local cluster runtime (one driver per instance, shared coordinator)
pub async fn run(args: CliArgs) -> Result<()> {
    if args.instances == 0 {
        bail!("--instances must be >= 1");
    }

    let settings = load_and_validate(args.config.as_deref())?;
    let job = JobArguments::new(&args.binary, &args.input, &args.format, &args.output);
    let run_id = args.run_id.clone().unwrap_or_else(new_run_id);

    let query_env: Vec<(String, String)> = std::env::vars().collect();
    let query = ClasspathQuery::hadoop(
        query_env.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        settings.classpath_command.as_deref(),
    );

    info!(
        %run_id,
        instances = args.instances,
        binary = %job.binary_path.display(),
        "launching"
    );

    let cluster = LocalCluster::new(settings, query)
        .with_query_env(query_env)
        .with_coordination_connect(args.coordination.clone());

    let results = cluster
        .run(&run_id, per_instance_jobs(&job, args.instances))
        .await;

    let done = results
        .iter()
        .filter(|r| matches!(r, Ok(report) if report.is_done()))
        .count();
    info!(%run_id, done, total = results.len(), "run complete");

    // Under the propagate policy a failed instance surfaces here.
    for result in results {
        result?;
    }
    Ok(())
}
