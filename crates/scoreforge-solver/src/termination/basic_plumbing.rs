//! External termination via a shared `AtomicBool` flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use scoreforge_core::Score;
use tracing::info;

use super::{Termination, TerminationKind, UNSUPPORTED_TIME_GRADIENT};
use crate::scope::{PhaseScope, SolverScope};

/// Requests early termination from any thread.
///
/// Cloned handles share one flag. The request is observed by the next
/// termination poll; the running step always completes.
#[derive(Debug, Clone, Default)]
pub struct TerminateEarlyHandle {
    flag: Arc<AtomicBool>,
}

impl TerminateEarlyHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests termination. Returns false if it was already requested.
    pub fn terminate_early(&self) -> bool {
        let first = !self.flag.swap(true, Ordering::AcqRel);
        if first {
            info!(event = "terminate_early");
        }
        first
    }

    pub fn is_terminate_early(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clears a previous request so the flag can be reused for a new solve.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Terminates once early termination was requested through its handle.
///
/// # Example
///
/// ```
/// use scoreforge_solver::termination::BasicPlumbingTermination;
///
/// let termination = BasicPlumbingTermination::new();
/// let handle = termination.handle();
///
/// // From another thread:
/// std::thread::spawn(move || handle.terminate_early()).join().unwrap();
/// assert!(termination.is_terminate_early());
/// ```
#[derive(Debug, Default)]
pub struct BasicPlumbingTermination {
    handle: TerminateEarlyHandle,
}

impl BasicPlumbingTermination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a termination observing an existing handle.
    pub fn with_handle(handle: TerminateEarlyHandle) -> Self {
        Self { handle }
    }

    /// A handle that can be sent to other threads.
    pub fn handle(&self) -> TerminateEarlyHandle {
        self.handle.clone()
    }

    pub fn terminate_early(&self) -> bool {
        self.handle.terminate_early()
    }

    pub fn is_terminate_early(&self) -> bool {
        self.handle.is_terminate_early()
    }
}

impl<Sc: Score> Termination<Sc> for BasicPlumbingTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::BasicPlumbing
    }

    fn is_solver_terminated(&self, _solver_scope: &SolverScope<Sc>) -> bool {
        self.is_terminate_early()
    }

    fn is_phase_terminated(&self, _phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.is_terminate_early()
    }

    fn calculate_solver_time_gradient(&self, _solver_scope: &SolverScope<Sc>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }

    fn calculate_phase_time_gradient(&self, _phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }
}
