// src/driver/state.rs

use std::fmt;

/// Lifecycle of one instance.
///
/// `Init -> EnteringBarrier -> Running -> LeavingBarrier -> Draining -> Done`,
/// with `Error` reachable from every non-terminal state. Once `Running` has
/// been reached, `LeavingBarrier` and `Draining` always follow, whatever the
/// outcome of `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    EnteringBarrier,
    Running,
    LeavingBarrier,
    Draining,
    Done,
    Error,
}

impl DriverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DriverState::Done | DriverState::Error)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: DriverState) -> bool {
        use DriverState::*;
        match (self, next) {
            (Init, EnteringBarrier)
            | (EnteringBarrier, Running)
            | (Running, LeavingBarrier)
            | (LeavingBarrier, Draining)
            | (Draining, Done) => true,
            (from, Error) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriverState::Init => "init",
            DriverState::EnteringBarrier => "entering-barrier",
            DriverState::Running => "running",
            DriverState::LeavingBarrier => "leaving-barrier",
            DriverState::Draining => "draining",
            DriverState::Done => "done",
            DriverState::Error => "error",
        };
        f.write_str(s)
    }
}
