// src/coord/local.rs

//! In-process double barrier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use super::{BarrierFuture, BarrierHandle, BarrierPhase, CoordinationService};
use crate::errors::{LaunchError, Result};

/// Arrival counters for one barrier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arrivals {
    pub entered: usize,
    pub left: usize,
}

impl Arrivals {
    fn count(&self, phase: BarrierPhase) -> usize {
        match phase {
            BarrierPhase::Enter => self.entered,
            BarrierPhase::Leave => self.left,
        }
    }

    fn count_mut(&mut self, phase: BarrierPhase) -> &mut usize {
        match phase {
            BarrierPhase::Enter => &mut self.entered,
            BarrierPhase::Leave => &mut self.left,
        }
    }
}

#[derive(Debug)]
struct BarrierState {
    party_count: usize,
    arrivals: watch::Sender<Arrivals>,
}

/// Coordination service living inside the current process.
///
/// Clones share the same barriers, so one `LocalCoordinator` handed to N
/// drivers behaves like N clients of one external service.
///
/// - A phase opens once its counter reaches the party count and never closes
///   again.
/// - A participant whose wait times out before the phase opens withdraws its
///   arrival.
#[derive(Debug, Clone, Default)]
pub struct LocalCoordinator {
    barriers: Arc<Mutex<HashMap<String, Arc<BarrierState>>>>,
}

impl LocalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counters of a barrier, if anyone has touched it yet.
    pub fn arrivals(&self, id: &str) -> Option<Arrivals> {
        let barriers = self.barriers.lock().ok()?;
        barriers.get(id).map(|state| *state.arrivals.borrow())
    }

    fn state_for(&self, barrier: &BarrierHandle) -> Result<Arc<BarrierState>> {
        let mut barriers = self
            .barriers
            .lock()
            .map_err(|_| LaunchError::Coordination("barrier registry poisoned".to_string()))?;

        let state = barriers
            .entry(barrier.id().to_string())
            .or_insert_with(|| {
                let (arrivals, _) = watch::channel(Arrivals::default());
                Arc::new(BarrierState {
                    party_count: barrier.party_count(),
                    arrivals,
                })
            })
            .clone();

        if state.party_count != barrier.party_count() {
            return Err(LaunchError::BarrierMismatch {
                id: barrier.id().to_string(),
                registered: state.party_count,
                requested: barrier.party_count(),
            });
        }
        Ok(state)
    }

    async fn arrive(
        &self,
        barrier: &BarrierHandle,
        phase: BarrierPhase,
        timeout: Duration,
    ) -> Result<()> {
        let state = self.state_for(barrier)?;
        let parties = barrier.party_count();

        let mut rx = state.arrivals.subscribe();
        state.arrivals.send_modify(|a| *a.count_mut(phase) += 1);
        debug!(
            barrier = barrier.id(),
            phase = phase.as_str(),
            arrived = rx.borrow().count(phase),
            parties,
            "arrived at barrier"
        );

        let waited = tokio::time::timeout(timeout, rx.wait_for(|a| a.count(phase) >= parties))
            .await
            .map(|res| res.is_ok());

        match waited {
            Ok(true) => Ok(()),
            Ok(false) => Err(LaunchError::Coordination(format!(
                "barrier '{}' closed while waiting to {}",
                barrier.id(),
                phase.as_str()
            ))),
            Err(_elapsed) => {
                let mut opened = false;
                state.arrivals.send_modify(|a| {
                    if a.count(phase) >= parties {
                        opened = true;
                    } else {
                        *a.count_mut(phase) -= 1;
                    }
                });
                if opened {
                    return Ok(());
                }
                debug!(
                    barrier = barrier.id(),
                    phase = phase.as_str(),
                    "barrier wait timed out; arrival withdrawn"
                );
                Err(LaunchError::BarrierTimeout {
                    id: barrier.id().to_string(),
                    parties,
                    timeout,
                })
            }
        }
    }
}

impl CoordinationService for LocalCoordinator {
    fn enter<'a>(&'a self, barrier: &'a BarrierHandle, timeout: Duration) -> BarrierFuture<'a> {
        Box::pin(self.arrive(barrier, BarrierPhase::Enter, timeout))
    }

    fn leave<'a>(&'a self, barrier: &'a BarrierHandle, timeout: Duration) -> BarrierFuture<'a> {
        Box::pin(self.arrive(barrier, BarrierPhase::Leave, timeout))
    }
}
