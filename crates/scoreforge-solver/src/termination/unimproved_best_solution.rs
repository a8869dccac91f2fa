//! Flat line detection on the best score curve.

use std::time::Duration;

use scoreforge_core::Score;

use super::{ratio_gradient, Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope, StepScope};

/// Default ratio of flat line to curve length that stops the phase.
pub const DEFAULT_FLAT_LINE_DETECTION_RATIO: f64 = 0.5;
/// Default ratio of flat line to curve length after which an improvement
/// starts a new curve.
pub const DEFAULT_NEW_CURVE_DETECTION_RATIO: f64 = 0.2;

/// Terminates when the best score has stayed flat for too long compared to
/// the time it took to reach it.
///
/// A curve starts at the phase start. While improvements keep coming the
/// curve grows; the flat line is the time since the last improvement.
/// The phase terminates once the flat line reaches
/// `flat_line_detection_ratio` times the curve length. An improvement after
/// a flat line longer than `new_curve_detection_ratio` times the curve
/// length starts a new curve.
#[derive(Debug, Clone)]
pub struct UnimprovedBestSolutionTermination<Sc: Score> {
    flat_line_detection_ratio: f64,
    new_curve_detection_ratio: f64,
    curve_start: Duration,
    last_improvement: Duration,
    last_best_score: Option<Sc>,
}

impl<Sc: Score> UnimprovedBestSolutionTermination<Sc> {
    pub fn new(flat_line_detection_ratio: f64, new_curve_detection_ratio: f64) -> Self {
        Self {
            flat_line_detection_ratio,
            new_curve_detection_ratio,
            curve_start: Duration::ZERO,
            last_improvement: Duration::ZERO,
            last_best_score: None,
        }
    }

    fn curve_length(&self) -> f64 {
        self.last_improvement
            .saturating_sub(self.curve_start)
            .as_secs_f64()
    }

    fn flat_line_length(&self, now: Duration) -> f64 {
        now.saturating_sub(self.last_improvement).as_secs_f64()
    }

    fn is_flat(&self, now: Duration) -> bool {
        let curve = self.curve_length();
        curve > 0.0 && self.flat_line_length(now) >= self.flat_line_detection_ratio * curve
    }

    fn gradient(&self, now: Duration) -> f64 {
        let curve = self.curve_length();
        if curve <= 0.0 {
            return 0.0;
        }
        ratio_gradient(
            self.flat_line_length(now),
            self.flat_line_detection_ratio * curve,
        )
    }

    fn restart(&mut self, now: Duration, best: Option<Sc>) {
        self.curve_start = now;
        self.last_improvement = now;
        self.last_best_score = best;
    }
}

impl<Sc: Score> Termination<Sc> for UnimprovedBestSolutionTermination<Sc> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::UnimprovedBestSolution
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        self.is_flat(solver_scope.now())
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.is_flat(phase_scope.solver_scope().now())
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        self.gradient(solver_scope.now())
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        self.gradient(phase_scope.solver_scope().now())
    }

    fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
        self.restart(solver_scope.now(), solver_scope.best_score().copied());
    }

    fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.restart(phase_scope.start_time(), phase_scope.best_score().copied());
    }

    fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        let solver_scope = step_scope.phase_scope().solver_scope();
        let Some(best) = solver_scope.best_score().copied() else {
            return;
        };
        if self.last_best_score.is_some_and(|last| best <= last) {
            return;
        }
        let now = solver_scope.best_score_time().unwrap_or_else(|| solver_scope.now());
        let curve = self.curve_length();
        if curve > 0.0 && self.flat_line_length(now) > self.new_curve_detection_ratio * curve {
            self.curve_start = self.last_improvement;
        }
        self.last_improvement = now;
        self.last_best_score = Some(best);
    }
}
