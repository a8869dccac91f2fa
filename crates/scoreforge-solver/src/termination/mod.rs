//! Termination conditions for the solver and its phases.
//!
//! Every termination answers two polls: [`Termination::is_solver_terminated`]
//! for the solver as a whole and [`Termination::is_phase_terminated`] for the
//! running phase. Leaves that need history (unimproved, diminished returns,
//! adaptive) follow the solving lifecycle through the `*_started` and
//! `*_ended` hooks; the polls themselves never mutate.
//!
//! Time gradients estimate progress towards termination in `[0.0, 1.0]`.
//! [`UNSUPPORTED_TIME_GRADIENT`] marks a termination that cannot estimate it.

mod adaptive;
mod basic_plumbing;
mod best_score;
mod composite;
mod diminished_returns;
mod factory;
mod hierarchy;
mod move_count;
mod score_calculation_count;
mod step_count;
mod time;
mod unimproved;
mod unimproved_best_solution;

use std::fmt::{self, Debug};

use scoreforge_core::Score;

use crate::scope::{PhaseScope, SolverScope, StepScope};

pub use adaptive::AdaptiveTermination;
pub use basic_plumbing::{BasicPlumbingTermination, TerminateEarlyHandle};
pub use best_score::{BestScoreFeasibleTermination, BestScoreTermination};
pub use composite::{AndTermination, OrTermination, TerminationList};
pub use diminished_returns::DiminishedReturnsTermination;
pub use factory::TerminationFactory;
pub use hierarchy::TerminationHierarchy;
pub use move_count::MoveCountTermination;
pub use score_calculation_count::ScoreCalculationCountTermination;
pub use step_count::StepCountTermination;
pub use time::TimeSpentTermination;
pub use unimproved::{UnimprovedStepCountTermination, UnimprovedTimeSpentTermination};
pub use unimproved_best_solution::UnimprovedBestSolutionTermination;

/// Time gradient of a termination that cannot estimate its progress.
pub const UNSUPPORTED_TIME_GRADIENT: f64 = -1.0;

/// Identifies the kind of a termination, e.g. in configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationKind {
    BasicPlumbing,
    TimeMillisSpent,
    UnimprovedTimeMillisSpent,
    StepCount,
    UnimprovedStepCount,
    ScoreCalculationCount,
    MoveCount,
    BestScore,
    BestScoreFeasible,
    UnimprovedBestSolution,
    DiminishedReturns,
    Adaptive,
    And,
    Or,
}

impl TerminationKind {
    /// True for kinds that only make sense for the solver as a whole.
    pub fn is_solver_only(self) -> bool {
        matches!(
            self,
            TerminationKind::UnimprovedTimeMillisSpent
                | TerminationKind::UnimprovedStepCount
                | TerminationKind::DiminishedReturns
        )
    }
}

impl fmt::Display for TerminationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Decides when to stop solving or the current phase.
///
/// # Type Parameters
/// * `Sc` - The score type
pub trait Termination<Sc: Score>: Send + Debug {
    fn kind(&self) -> TerminationKind;

    /// Returns true if the solver should stop.
    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool;

    /// Returns true if the current phase should stop.
    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool;

    /// Progress towards solver termination, or [`UNSUPPORTED_TIME_GRADIENT`].
    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64;

    /// Progress towards phase termination, or [`UNSUPPORTED_TIME_GRADIENT`].
    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64;

    /// Visits the direct children of a composite termination.
    fn for_each_child(&self, _visit: &mut dyn FnMut(&dyn Termination<Sc>)) {}

    fn solving_started(&mut self, _solver_scope: &SolverScope<Sc>) {}

    fn phase_started(&mut self, _phase_scope: &PhaseScope<'_, Sc>) {}

    fn step_started(&mut self, _step_scope: &StepScope<'_, '_, Sc>) {}

    fn step_ended(&mut self, _step_scope: &StepScope<'_, '_, Sc>) {}

    fn phase_ended(&mut self, _phase_scope: &PhaseScope<'_, Sc>) {}

    fn solving_ended(&mut self, _solver_scope: &SolverScope<Sc>) {}
}

impl<Sc: Score> Termination<Sc> for Box<dyn Termination<Sc>> {
    fn kind(&self) -> TerminationKind {
        (**self).kind()
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        (**self).is_solver_terminated(solver_scope)
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        (**self).is_phase_terminated(phase_scope)
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        (**self).calculate_solver_time_gradient(solver_scope)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        (**self).calculate_phase_time_gradient(phase_scope)
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Termination<Sc>)) {
        (**self).for_each_child(visit)
    }

    fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
        (**self).solving_started(solver_scope)
    }

    fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        (**self).phase_started(phase_scope)
    }

    fn step_started(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        (**self).step_started(step_scope)
    }

    fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        (**self).step_ended(step_scope)
    }

    fn phase_ended(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        (**self).phase_ended(phase_scope)
    }

    fn solving_ended(&mut self, solver_scope: &SolverScope<Sc>) {
        (**self).solving_ended(solver_scope)
    }
}

/// Collects the kinds of all leaves under `termination`.
pub fn leaf_kinds<Sc: Score>(termination: &dyn Termination<Sc>) -> Vec<TerminationKind> {
    let mut kinds = Vec::new();
    collect_leaf_kinds(termination, &mut kinds);
    kinds
}

fn collect_leaf_kinds<Sc: Score>(termination: &dyn Termination<Sc>, kinds: &mut Vec<TerminationKind>) {
    match termination.kind() {
        TerminationKind::And | TerminationKind::Or => {
            termination.for_each_child(&mut |child: &dyn Termination<Sc>| {
                collect_leaf_kinds(child, kinds)
            });
        }
        kind => kinds.push(kind),
    }
}

// Fraction of `limit` reached by `value`, capped at 1.0.
pub(crate) fn ratio_gradient(value: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 1.0;
    }
    (value / limit).min(1.0)
}
