//! Phase-level scope.

use std::time::Duration;

use scoreforge_core::Score;

use super::SolverScope;

/// Kind of phase a [`PhaseScope`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    ConstructionHeuristic,
    LocalSearch,
    ExhaustiveSearch,
    Custom,
}

/// Scope for a single phase of solving.
///
/// # Type Parameters
/// * `'a` - Lifetime of the solver scope reference
/// * `Sc` - The score type
pub struct PhaseScope<'a, Sc: Score> {
    /// Reference to the parent solver scope.
    solver_scope: &'a mut SolverScope<Sc>,
    /// Index of this phase (0-based).
    phase_index: usize,
    kind: PhaseKind,
    /// Best score at the start of this phase.
    starting_score: Option<Sc>,
    /// Number of completed steps in this phase.
    step_count: u64,
    /// Clock reading when this phase started.
    start_time: Duration,
    starting_score_calculation_count: u64,
    starting_move_evaluation_count: u64,
}

impl<'a, Sc: Score> PhaseScope<'a, Sc> {
    /// Creates a new phase scope.
    pub fn new(solver_scope: &'a mut SolverScope<Sc>, phase_index: usize, kind: PhaseKind) -> Self {
        let starting_score = solver_scope.best_score().copied();
        let start_time = solver_scope.now();
        let starting_score_calculation_count = solver_scope.score_calculation_count();
        let starting_move_evaluation_count = solver_scope.move_evaluation_count();
        Self {
            solver_scope,
            phase_index,
            kind,
            starting_score,
            step_count: 0,
            start_time,
            starting_score_calculation_count,
            starting_move_evaluation_count,
        }
    }

    /// Returns the phase index.
    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    /// Returns the best score at the start of this phase.
    pub fn starting_score(&self) -> Option<&Sc> {
        self.starting_score.as_ref()
    }

    /// Returns the best score found so far by the solver.
    pub fn best_score(&self) -> Option<&Sc> {
        self.solver_scope.best_score()
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    /// Returns the time spent in this phase.
    pub fn time_spent(&self) -> Duration {
        self.solver_scope.now().saturating_sub(self.start_time)
    }

    /// Returns the step count for this phase.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Increments the phase step count and the solver's total.
    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.solver_scope.increment_step_count();
        self.step_count
    }

    /// Score calculations performed during this phase.
    pub fn score_calculation_count(&self) -> u64 {
        self.solver_scope.score_calculation_count() - self.starting_score_calculation_count
    }

    pub fn add_score_calculation_count(&mut self, count: u64) {
        self.solver_scope.add_score_calculation_count(count);
    }

    /// Moves evaluated during this phase.
    pub fn move_evaluation_count(&self) -> u64 {
        self.solver_scope.move_evaluation_count() - self.starting_move_evaluation_count
    }

    pub fn add_move_evaluation_count(&mut self, count: u64) {
        self.solver_scope.add_move_evaluation_count(count);
    }

    /// Returns a reference to the solver scope.
    pub fn solver_scope(&self) -> &SolverScope<Sc> {
        self.solver_scope
    }

    /// Returns a mutable reference to the solver scope.
    pub fn solver_scope_mut(&mut self) -> &mut SolverScope<Sc> {
        self.solver_scope
    }
}
