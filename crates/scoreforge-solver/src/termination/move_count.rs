//! Move count termination.

use scoreforge_core::Score;

use super::{ratio_gradient, Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates when a maximum number of moves have been evaluated.
///
/// # Example
///
/// ```
/// use scoreforge_solver::termination::MoveCountTermination;
///
/// // Terminate after evaluating 100,000 moves
/// let termination = MoveCountTermination::new(100_000);
/// ```
#[derive(Debug, Clone)]
pub struct MoveCountTermination {
    limit: u64,
}

impl MoveCountTermination {
    /// Creates a new move count termination.
    ///
    /// # Arguments
    /// * `limit` - Maximum moves to evaluate before terminating
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<Sc: Score> Termination<Sc> for MoveCountTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::MoveCount
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        solver_scope.move_evaluation_count() >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        phase_scope.move_evaluation_count() >= self.limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        ratio_gradient(solver_scope.move_evaluation_count() as f64, self.limit as f64)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        ratio_gradient(phase_scope.move_evaluation_count() as f64, self.limit as f64)
    }
}
