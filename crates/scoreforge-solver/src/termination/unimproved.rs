//! Termination conditions based on lack of improvement.
//!
//! Both terminations here only apply to the solver as a whole. Their phase
//! polls answer for the solver, so a phase running under them stops when
//! the solver would.

use std::time::Duration;

use scoreforge_core::Score;

use super::{ratio_gradient, Termination, TerminationKind};
use crate::scope::{PhaseKind, PhaseScope, SolverScope, StepScope};

/// Terminates if no improvement occurs for a specified number of steps.
///
/// This is useful to avoid spending too much time when the solver has
/// plateaued and is unlikely to find better solutions. The count restarts
/// at the start of every phase.
///
/// # Example
///
/// ```
/// use scoreforge_solver::termination::UnimprovedStepCountTermination;
///
/// // Terminate after 100 steps without improvement
/// let term = UnimprovedStepCountTermination::new(100);
/// ```
#[derive(Debug, Clone)]
pub struct UnimprovedStepCountTermination {
    limit: u64,
    last_improved_step: u64,
}

impl UnimprovedStepCountTermination {
    /// Creates a termination that stops after `limit` steps without improvement.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            last_improved_step: 0,
        }
    }

    fn unimproved_steps<Sc: Score>(&self, solver_scope: &SolverScope<Sc>) -> u64 {
        solver_scope
            .total_step_count()
            .saturating_sub(self.last_improved_step)
    }
}

impl<Sc: Score> Termination<Sc> for UnimprovedStepCountTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::UnimprovedStepCount
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        self.unimproved_steps(solver_scope) >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.is_solver_terminated(phase_scope.solver_scope())
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        ratio_gradient(self.unimproved_steps(solver_scope) as f64, self.limit as f64)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        self.calculate_solver_time_gradient(phase_scope.solver_scope())
    }

    fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
        self.last_improved_step = solver_scope.total_step_count();
    }

    fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.last_improved_step = phase_scope.solver_scope().total_step_count();
    }

    fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        if step_scope.best_score_improved() {
            self.last_improved_step = step_scope.phase_scope().solver_scope().total_step_count();
        }
    }
}

/// Terminates if no improvement occurs for a specified duration.
///
/// With a score difference threshold, only a best score that beats the
/// last accepted improvement by at least the threshold resets the clock.
/// Construction heuristic phases are ignored: the clock restarts when the
/// next phase starts. Once the limit has passed at a step end, later
/// improvements no longer help.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use scoreforge_solver::termination::UnimprovedTimeSpentTermination;
/// use scoreforge_core::SimpleScore;
///
/// // Terminate after 5 seconds without improvement
/// let term = UnimprovedTimeSpentTermination::<SimpleScore>::new(Duration::from_secs(5));
///
/// // Only count improvements of at least 10
/// let term = UnimprovedTimeSpentTermination::new(Duration::from_secs(5))
///     .with_score_difference_threshold(SimpleScore::of(10));
/// ```
#[derive(Debug, Clone)]
pub struct UnimprovedTimeSpentTermination<Sc: Score> {
    limit: Duration,
    score_difference_threshold: Option<Sc>,
    // Clock reading of the last accepted improvement.
    reset_time: Duration,
    reference_score: Option<Sc>,
    active: bool,
    terminated: bool,
}

impl<Sc: Score> UnimprovedTimeSpentTermination<Sc> {
    /// Creates a termination that stops after `limit` time without improvement.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            score_difference_threshold: None,
            reset_time: Duration::ZERO,
            reference_score: None,
            active: false,
            terminated: false,
        }
    }

    /// Creates a termination with limit in milliseconds.
    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn with_score_difference_threshold(mut self, threshold: Sc) -> Self {
        self.score_difference_threshold = Some(threshold);
        self
    }

    fn unimproved_time(&self, now: Duration) -> Duration {
        now.saturating_sub(self.reset_time)
    }

    fn is_improvement(&self, best: Sc) -> bool {
        match (self.reference_score, self.score_difference_threshold) {
            (None, _) => true,
            (Some(reference), None) => best > reference,
            (Some(reference), Some(threshold)) => best - reference >= threshold,
        }
    }

    fn restart(&mut self, now: Duration, best: Option<Sc>) {
        self.reset_time = now;
        self.reference_score = best;
        self.terminated = false;
    }
}

impl<Sc: Score> Termination<Sc> for UnimprovedTimeSpentTermination<Sc> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::UnimprovedTimeMillisSpent
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        if !self.active {
            return false;
        }
        self.terminated || self.unimproved_time(solver_scope.now()) > self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.is_solver_terminated(phase_scope.solver_scope())
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        if !self.active {
            return 0.0;
        }
        if self.terminated {
            return 1.0;
        }
        ratio_gradient(
            self.unimproved_time(solver_scope.now()).as_secs_f64(),
            self.limit.as_secs_f64(),
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        self.calculate_solver_time_gradient(phase_scope.solver_scope())
    }

    fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
        self.restart(solver_scope.now(), solver_scope.best_score().copied());
        self.active = false;
    }

    fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.active = phase_scope.kind() != PhaseKind::ConstructionHeuristic;
        if self.active {
            self.restart(phase_scope.start_time(), phase_scope.best_score().copied());
        }
    }

    fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        if !self.active || self.terminated {
            return;
        }
        let solver_scope = step_scope.phase_scope().solver_scope();
        let now = solver_scope.now();
        if self.unimproved_time(now) > self.limit {
            self.terminated = true;
            return;
        }
        if let Some(best) = solver_scope.best_score().copied() {
            if self.is_improvement(best) {
                let found_at = solver_scope.best_score_time().unwrap_or(now);
                self.reset_time = found_at.max(self.reset_time);
                self.reference_score = Some(best);
            }
        }
    }

    fn phase_ended(&mut self, _phase_scope: &PhaseScope<'_, Sc>) {
        self.active = false;
    }
}
