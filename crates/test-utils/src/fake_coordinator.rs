use std::sync::{Arc, Mutex};
use std::time::Duration;

use graphlaunch::coord::{
    BarrierFuture, BarrierHandle, BarrierPhase, CoordinationService, LocalCoordinator,
};
use graphlaunch::errors::LaunchError;

/// One call made against the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrierCall {
    pub phase: BarrierPhase,
    pub id: String,
    pub parties: usize,
}

/// A coordinator that:
/// - records every `enter` / `leave` call
/// - delegates to a real `LocalCoordinator`
/// - can be told to fail either phase with a coordination error.
#[derive(Debug, Clone, Default)]
pub struct RecordingCoordinator {
    inner: LocalCoordinator,
    calls: Arc<Mutex<Vec<BarrierCall>>>,
    fail_enter: bool,
    fail_leave: bool,
}

impl RecordingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_enter(mut self) -> Self {
        self.fail_enter = true;
        self
    }

    pub fn failing_leave(mut self) -> Self {
        self.fail_leave = true;
        self
    }

    pub fn calls(&self) -> Vec<BarrierCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, phase: BarrierPhase) -> usize {
        self.calls().iter().filter(|c| c.phase == phase).count()
    }

    fn record(&self, phase: BarrierPhase, barrier: &BarrierHandle) {
        self.calls.lock().unwrap().push(BarrierCall {
            phase,
            id: barrier.id().to_string(),
            parties: barrier.party_count(),
        });
    }
}

impl CoordinationService for RecordingCoordinator {
    fn enter<'a>(&'a self, barrier: &'a BarrierHandle, timeout: Duration) -> BarrierFuture<'a> {
        self.record(BarrierPhase::Enter, barrier);
        if self.fail_enter {
            return Box::pin(async {
                Err::<(), _>(LaunchError::Coordination("injected enter failure".to_string()))
            });
        }
        self.inner.enter(barrier, timeout)
    }

    fn leave<'a>(&'a self, barrier: &'a BarrierHandle, timeout: Duration) -> BarrierFuture<'a> {
        self.record(BarrierPhase::Leave, barrier);
        if self.fail_leave {
            return Box::pin(async {
                Err::<(), _>(LaunchError::Coordination("injected leave failure".to_string()))
            });
        }
        self.inner.leave(barrier, timeout)
    }
}
