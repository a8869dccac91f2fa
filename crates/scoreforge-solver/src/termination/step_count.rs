//! Step count termination.

use scoreforge_core::Score;

use super::{ratio_gradient, Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates after a step count.
///
/// Counts all steps at solver level and the phase's own steps at phase level.
///
/// # Example
///
/// ```
/// use scoreforge_solver::termination::StepCountTermination;
///
/// // Terminate after 1000 steps
/// let term = StepCountTermination::new(1000);
/// ```
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<Sc: Score> Termination<Sc> for StepCountTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::StepCount
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        solver_scope.total_step_count() >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        phase_scope.step_count() >= self.limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        ratio_gradient(solver_scope.total_step_count() as f64, self.limit as f64)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        ratio_gradient(phase_scope.step_count() as f64, self.limit as f64)
    }
}
