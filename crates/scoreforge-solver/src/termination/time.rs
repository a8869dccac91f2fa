//! Time-based termination.

use std::time::Duration;

use scoreforge_core::Score;

use super::{ratio_gradient, Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates after a time limit, measured on the scope's clock.
///
/// At solver level the limit counts from the start of solving, at phase
/// level from the start of the phase.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use scoreforge_solver::termination::TimeSpentTermination;
///
/// // Terminate after 30 seconds
/// let term = TimeSpentTermination::new(Duration::from_secs(30));
///
/// // Or use convenience constructors
/// let term = TimeSpentTermination::seconds(30);
/// let term = TimeSpentTermination::millis(500);
/// ```
#[derive(Debug, Clone)]
pub struct TimeSpentTermination {
    limit: Duration,
}

impl TimeSpentTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    fn gradient(&self, spent: Duration) -> f64 {
        ratio_gradient(spent.as_secs_f64(), self.limit.as_secs_f64())
    }
}

impl<Sc: Score> Termination<Sc> for TimeSpentTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::TimeMillisSpent
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        solver_scope.time_spent() >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        phase_scope.time_spent() >= self.limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        self.gradient(solver_scope.time_spent())
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        self.gradient(phase_scope.time_spent())
    }
}
