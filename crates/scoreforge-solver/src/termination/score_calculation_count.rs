//! Score calculation count termination.

use scoreforge_core::Score;

use super::{ratio_gradient, Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates when a maximum number of score calculations is reached.
///
/// The count is whatever the solving loop reports through
/// `add_score_calculation_count` on its scopes.
///
/// # Example
///
/// ```
/// use scoreforge_solver::termination::ScoreCalculationCountTermination;
///
/// // Terminate after 10,000 score calculations
/// let termination = ScoreCalculationCountTermination::new(10_000);
/// ```
#[derive(Debug, Clone)]
pub struct ScoreCalculationCountTermination {
    /// Maximum number of score calculations before termination.
    score_calculation_count_limit: u64,
}

impl ScoreCalculationCountTermination {
    /// Creates a new score calculation count termination.
    pub fn new(score_calculation_count_limit: u64) -> Self {
        Self {
            score_calculation_count_limit,
        }
    }
}

impl<Sc: Score> Termination<Sc> for ScoreCalculationCountTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::ScoreCalculationCount
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        solver_scope.score_calculation_count() >= self.score_calculation_count_limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        phase_scope.score_calculation_count() >= self.score_calculation_count_limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        ratio_gradient(
            solver_scope.score_calculation_count() as f64,
            self.score_calculation_count_limit as f64,
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        ratio_gradient(
            phase_scope.score_calculation_count() as f64,
            self.score_calculation_count_limit as f64,
        )
    }
}
