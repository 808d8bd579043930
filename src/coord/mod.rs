// src/coord/mod.rs

//! Barrier coordination.
//!
//! All instances of one run meet twice: once before any of them launches the
//! binary (`enter`) and once after every binary has exited (`leave`). The
//! rendezvous itself is provided by an external coordination service; the
//! launcher only talks to it through [`CoordinationService`].
//!
//! - [`local`] is an in-process implementation shared by every driver of a
//!   single-machine run, and the one the tests use.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::{LaunchError, Result};

pub mod local;

pub use local::LocalCoordinator;

/// Fixed suffix appended to the run id to name the run's barrier.
pub const BARRIER_SUFFIX: &str = "barrier";

/// Identifies one rendezvous point: a name plus the number of parties that
/// must arrive before it opens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarrierHandle {
    id: String,
    party_count: usize,
}

impl BarrierHandle {
    pub fn new(id: impl Into<String>, party_count: usize) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LaunchError::ConfigError("barrier id is empty".to_string()));
        }
        if party_count == 0 {
            return Err(LaunchError::ConfigError(format!(
                "barrier '{id}' needs at least one party"
            )));
        }
        Ok(Self { id, party_count })
    }

    /// The barrier shared by all instances of one run.
    ///
    /// Scoping the id by run keeps unrelated runs on the same coordination
    /// service apart.
    pub fn for_run(run_id: &str, party_count: usize) -> Result<Self> {
        Self::new(format!("{run_id}-{BARRIER_SUFFIX}"), party_count)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn party_count(&self) -> usize {
        self.party_count
    }
}

/// The two phases of a double barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierPhase {
    Enter,
    Leave,
}

impl BarrierPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            BarrierPhase::Enter => "enter",
            BarrierPhase::Leave => "leave",
        }
    }
}

pub type BarrierFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Client side of a double-barrier coordination service.
///
/// Both methods resolve to:
/// - `Ok(())` once `party_count` participants have arrived at that phase,
/// - `Err(LaunchError::BarrierTimeout { .. })` if that did not happen within
///   `timeout`,
/// - any other `Err` if the service itself failed.
pub trait CoordinationService: Send + Sync + Debug {
    fn enter<'a>(&'a self, barrier: &'a BarrierHandle, timeout: Duration) -> BarrierFuture<'a>;

    fn leave<'a>(&'a self, barrier: &'a BarrierHandle, timeout: Duration) -> BarrierFuture<'a>;
}
