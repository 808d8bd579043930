// src/env.rs

//! Child-process environment.
//!
//! The binary gets a fresh environment made of exactly these variables;
//! nothing is inherited from the launcher.

pub const CLASSPATH: &str = "CLASSPATH";
pub const ZK_SERVERS: &str = "ZK_SERVERS";
pub const ZK_JOBNAME: &str = "ZK_JOBNAME";
pub const ZK_NUMNODES: &str = "ZK_NUMNODES";

/// Inputs of [`build_child_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEnvParams<'a> {
    pub classpath: &'a str,
    pub zk_servers: &'a str,
    pub job_name: &'a str,
    pub instance_count: usize,
}

/// Build the child's complete environment, in a fixed order.
pub fn build_child_env(params: &ChildEnvParams<'_>) -> Vec<(String, String)> {
    vec![
        (CLASSPATH.to_string(), params.classpath.to_string()),
        (ZK_SERVERS.to_string(), params.zk_servers.to_string()),
        (ZK_JOBNAME.to_string(), params.job_name.to_string()),
        (ZK_NUMNODES.to_string(), params.instance_count.to_string()),
    ]
}
