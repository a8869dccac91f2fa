//! Adaptive termination with a warm-up grace period.

use std::time::Duration;

use scoreforge_core::Score;

use super::diminished_returns::improvement_ratio;
use super::{Termination, TerminationKind, UNSUPPORTED_TIME_GRADIENT};
use crate::scope::{PhaseScope, SolverScope, StepScope};

/// Terminates when the improvement rate drops below a ratio of the rate
/// seen during the grace period at the start of the phase.
///
/// No decision is made during the grace period. After it, the improvement
/// made since the grace period ended is scaled to the grace period length
/// and compared with the grace period improvement, once at least one more
/// grace period has passed. A phase that did not improve during its grace
/// period terminates as soon as the grace period is over.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use scoreforge_solver::termination::AdaptiveTermination;
/// use scoreforge_core::HardSoftScore;
///
/// let term = AdaptiveTermination::<HardSoftScore>::new(Duration::from_secs(30), 0.0001);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveTermination<Sc: Score> {
    grace_period: Duration,
    minimum_improvement_ratio: f64,
    start_time: Duration,
    starting_best: Option<Sc>,
    grace_end: Option<GraceEnd<Sc>>,
    terminated: bool,
}

#[derive(Debug, Clone)]
struct GraceEnd<Sc: Score> {
    time: Duration,
    best: Sc,
    improvement: Vec<f64>,
}

impl<Sc: Score> AdaptiveTermination<Sc> {
    pub fn new(grace_period: Duration, minimum_improvement_ratio: f64) -> Self {
        Self {
            grace_period,
            minimum_improvement_ratio,
            start_time: Duration::ZERO,
            starting_best: None,
            grace_end: None,
            terminated: false,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    fn restart(&mut self, now: Duration, best: Option<Sc>) {
        self.start_time = now;
        self.starting_best = best;
        self.grace_end = None;
        self.terminated = false;
    }

    fn record(&mut self, now: Duration, best: Sc) {
        if self.terminated || now.saturating_sub(self.start_time) < self.grace_period {
            return;
        }
        let Some(grace_end) = &self.grace_end else {
            self.end_grace_period(now, best);
            return;
        };
        let elapsed = now.saturating_sub(grace_end.time);
        if elapsed < self.grace_period {
            return;
        }
        let scale = self.grace_period.as_secs_f64() / elapsed.as_secs_f64();
        let recent: Vec<f64> = (best - grace_end.best)
            .to_level_numbers()
            .into_iter()
            .map(|level| level * scale)
            .collect();
        let ratio = improvement_ratio(&grace_end.improvement, &recent);
        self.terminated = ratio < self.minimum_improvement_ratio;
    }

    fn end_grace_period(&mut self, now: Duration, best: Sc) {
        let starting_best = *self.starting_best.get_or_insert(best);
        let improvement = (best - starting_best).to_level_numbers();
        if improvement.iter().all(|level| *level == 0.0) {
            self.terminated = true;
            return;
        }
        self.grace_end = Some(GraceEnd {
            time: now,
            best,
            improvement,
        });
    }
}

impl<Sc: Score> Termination<Sc> for AdaptiveTermination<Sc> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::Adaptive
    }

    fn is_solver_terminated(&self, _solver_scope: &SolverScope<Sc>) -> bool {
        self.terminated
    }

    fn is_phase_terminated(&self, _phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.terminated
    }

    fn calculate_solver_time_gradient(&self, _solver_scope: &SolverScope<Sc>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }

    fn calculate_phase_time_gradient(&self, _phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }

    fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
        self.restart(solver_scope.now(), solver_scope.best_score().copied());
    }

    fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.restart(phase_scope.start_time(), phase_scope.best_score().copied());
    }

    fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        let solver_scope = step_scope.phase_scope().solver_scope();
        if let Some(best) = solver_scope.best_score().copied() {
            self.record(solver_scope.now(), best);
        }
    }
}
