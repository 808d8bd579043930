// src/classpath/mod.rs

//! Classpath resolution for the child process.
//!
//! - [`query`] runs the external listing command with a sanitized environment.
//! - [`expand`] turns the listing (which may contain wildcards) into concrete
//!   paths.

pub mod expand;
pub mod query;

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::logging::LogSink;

pub use expand::{expand_classpath, join_classpath, PATH_SEPARATOR};
pub use query::{sanitize_env, ClasspathQuery};

/// Runs the classpath query and expands its output.
#[derive(Debug, Clone)]
pub struct ClasspathResolver {
    query: ClasspathQuery,
    fs: Arc<dyn FileSystem>,
}

impl ClasspathResolver {
    pub fn new(query: ClasspathQuery, fs: Arc<dyn FileSystem>) -> Self {
        Self { query, fs }
    }

    /// Resolve the classpath as a single `CLASSPATH` value.
    ///
    /// `base_env` is the environment the query starts from (normally the
    /// launcher's own); it is sanitized before use.
    pub async fn resolve(
        &self,
        base_env: Vec<(String, String)>,
        sink: Arc<dyn LogSink>,
    ) -> Result<String> {
        let raw = self.query.run(base_env, sink).await?;
        let paths = expand_classpath(self.fs.as_ref(), &raw);
        info!(entries = paths.len(), "resolved classpath");
        Ok(join_classpath(&paths))
    }
}
