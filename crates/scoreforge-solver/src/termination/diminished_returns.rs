//! Diminished returns termination.

use std::collections::VecDeque;
use std::time::Duration;

use scoreforge_core::Score;

use super::{Termination, TerminationKind, UNSUPPORTED_TIME_GRADIENT};
use crate::scope::{PhaseScope, SolverScope, StepScope};

/// Terminates when the improvement within a sliding window falls below a
/// ratio of the improvement made in the first window of the phase.
///
/// Improvements are compared on the highest score level that changed, so a
/// hard level improvement always counts as progress. A phase that does not
/// improve at all during its first window terminates once that window has
/// passed.
///
/// Only applicable to the solver as a whole.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use scoreforge_solver::termination::DiminishedReturnsTermination;
/// use scoreforge_core::SimpleScore;
///
/// let term = DiminishedReturnsTermination::<SimpleScore>::new(
///     Duration::from_secs(10),
///     0.1,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DiminishedReturnsTermination<Sc: Score> {
    window: Duration,
    minimum_improvement_ratio: f64,
    state: DiminishedState<Sc>,
}

#[derive(Debug, Clone)]
struct DiminishedState<Sc: Score> {
    // Best scores by clock reading, oldest first.
    samples: VecDeque<(Duration, Sc)>,
    start_time: Option<Duration>,
    initial_improvement: Option<Vec<f64>>,
    terminated: bool,
}

impl<Sc: Score> Default for DiminishedState<Sc> {
    fn default() -> Self {
        Self {
            samples: VecDeque::new(),
            start_time: None,
            initial_improvement: None,
            terminated: false,
        }
    }
}

impl<Sc: Score> DiminishedReturnsTermination<Sc> {
    pub fn new(window: Duration, minimum_improvement_ratio: f64) -> Self {
        Self {
            window,
            minimum_improvement_ratio,
            state: DiminishedState::default(),
        }
    }

    pub fn with_seconds(window_secs: u64, minimum_improvement_ratio: f64) -> Self {
        Self::new(Duration::from_secs(window_secs), minimum_improvement_ratio)
    }

    fn record(&mut self, now: Duration, best: Sc) {
        let state = &mut self.state;
        let start = *state.start_time.get_or_insert(now);
        // The best score is a step function; only changes need a sample.
        if state.samples.back().map_or(true, |&(_, last)| last != best) {
            state.samples.push_back((now, best));
        }

        if now.saturating_sub(start) < self.window {
            return;
        }
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        // Keep the newest sample at or before the cutoff as window baseline.
        while state.samples.len() > 1 && state.samples[1].0 <= cutoff {
            state.samples.pop_front();
        }
        let Some(&(_, baseline)) = state.samples.front() else {
            return;
        };
        let window_improvement = (best - baseline).to_level_numbers();

        let ratio = state
            .initial_improvement
            .as_deref()
            .map(|initial| improvement_ratio(initial, &window_improvement));
        match ratio {
            Some(ratio) => state.terminated = ratio < self.minimum_improvement_ratio,
            None if window_improvement.iter().all(|level| *level == 0.0) => {
                state.terminated = true;
            }
            None => state.initial_improvement = Some(window_improvement),
        }
    }
}

// Ratio of `window` to `initial` on the highest level where either moved.
pub(super) fn improvement_ratio(initial: &[f64], window: &[f64]) -> f64 {
    for (initial, window) in initial.iter().zip(window) {
        if *window == 0.0 && *initial == 0.0 {
            continue;
        }
        if *initial <= 0.0 {
            return if *window > 0.0 { f64::INFINITY } else { 0.0 };
        }
        return window / initial;
    }
    0.0
}

impl<Sc: Score> Termination<Sc> for DiminishedReturnsTermination<Sc> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::DiminishedReturns
    }

    fn is_solver_terminated(&self, _solver_scope: &SolverScope<Sc>) -> bool {
        self.state.terminated
    }

    fn is_phase_terminated(&self, _phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.state.terminated
    }

    fn calculate_solver_time_gradient(&self, _solver_scope: &SolverScope<Sc>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }

    fn calculate_phase_time_gradient(&self, _phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }

    fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.state = DiminishedState::default();
        if let Some(best) = phase_scope.best_score().copied() {
            self.record(phase_scope.start_time(), best);
        }
    }

    fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        let solver_scope = step_scope.phase_scope().solver_scope();
        if let Some(best) = solver_scope.best_score().copied() {
            self.record(solver_scope.now(), best);
        }
    }

    fn phase_ended(&mut self, _phase_scope: &PhaseScope<'_, Sc>) {
        self.state = DiminishedState::default();
    }
}
