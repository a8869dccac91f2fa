//! Score-based termination conditions.

use scoreforge_core::Score;

use super::{Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope};

/// Default share of the remaining gradient each higher score level takes.
pub(crate) const DEFAULT_TIME_GRADIENT_WEIGHT: f64 = 0.5;

/// Terminates when best score reaches or exceeds a target.
///
/// # Example
///
/// ```
/// use scoreforge_solver::termination::BestScoreTermination;
/// use scoreforge_core::SimpleScore;
///
/// let term = BestScoreTermination::new(SimpleScore::of(0));
/// ```
#[derive(Debug, Clone)]
pub struct BestScoreTermination<Sc: Score> {
    target_score: Sc,
    time_gradient_weights: Vec<f64>,
}

impl<Sc: Score> BestScoreTermination<Sc> {
    pub fn new(target_score: Sc) -> Self {
        let weights = vec![DEFAULT_TIME_GRADIENT_WEIGHT; Sc::levels_count().saturating_sub(1)];
        Self::with_time_gradient_weights(target_score, weights)
    }

    /// `time_gradient_weights[i]` is the share of the remaining gradient
    /// taken by level `i`; the last level takes whatever remains.
    pub fn with_time_gradient_weights(target_score: Sc, time_gradient_weights: Vec<f64>) -> Self {
        Self {
            target_score,
            time_gradient_weights,
        }
    }

    pub fn target_score(&self) -> &Sc {
        &self.target_score
    }

    fn is_reached(&self, best_score: Option<&Sc>) -> bool {
        best_score.is_some_and(|score| *score >= self.target_score)
    }

    /// Progress of `score` from `start` towards the target.
    pub fn calculate_time_gradient(&self, start: &Sc, score: &Sc) -> f64 {
        calculate_time_gradient(
            &start.to_level_numbers(),
            &self.target_score.to_level_numbers(),
            &score.to_level_numbers(),
            &self.time_gradient_weights,
        )
    }

    fn gradient(&self, start: Option<&Sc>, best: Option<&Sc>) -> f64 {
        match (start, best) {
            (Some(start), Some(best)) => self.calculate_time_gradient(start, best),
            _ => 0.0,
        }
    }
}

impl<Sc: Score> Termination<Sc> for BestScoreTermination<Sc> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::BestScore
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        self.is_reached(solver_scope.best_score())
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        self.is_reached(phase_scope.best_score())
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        self.gradient(
            solver_scope.starting_initialized_score(),
            solver_scope.best_score(),
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        self.gradient(phase_scope.starting_score(), phase_scope.best_score())
    }
}

/// Terminates when best score becomes feasible.
///
/// Single level scores are always feasible.
#[derive(Debug, Clone)]
pub struct BestScoreFeasibleTermination {
    time_gradient_weights: Vec<f64>,
}

impl BestScoreFeasibleTermination {
    pub fn new<Sc: Score>() -> Self {
        let weights =
            vec![DEFAULT_TIME_GRADIENT_WEIGHT; Sc::feasible_levels_count().saturating_sub(1)];
        Self {
            time_gradient_weights: weights,
        }
    }

    // Progress over the feasibility levels only, towards zero.
    fn gradient<Sc: Score>(&self, start: Option<&Sc>, best: Option<&Sc>) -> f64 {
        let Some(best) = best else {
            return 0.0;
        };
        if best.is_feasible() {
            return 1.0;
        }
        let Some(start) = start else {
            return 0.0;
        };
        let levels = Sc::feasible_levels_count();
        let start = &start.to_level_numbers()[..levels];
        let score = &best.to_level_numbers()[..levels];
        let end = vec![0.0; levels];
        calculate_time_gradient(start, &end, score, &self.time_gradient_weights)
    }
}

impl<Sc: Score> Termination<Sc> for BestScoreFeasibleTermination {
    fn kind(&self) -> TerminationKind {
        TerminationKind::BestScoreFeasible
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        solver_scope.best_score().is_some_and(|score| score.is_feasible())
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        phase_scope.best_score().is_some_and(|score| score.is_feasible())
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        self.gradient(
            solver_scope.starting_initialized_score(),
            solver_scope.best_score(),
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        self.gradient(phase_scope.starting_score(), phase_scope.best_score())
    }
}

/// Weighted progress from `start` to `end` over score levels.
///
/// Levels are visited from highest priority down. A level worse than its
/// start ends the calculation; a level better than its end completes it.
pub(crate) fn calculate_time_gradient(start: &[f64], end: &[f64], score: &[f64], weights: &[f64]) -> f64 {
    let levels = score.len();
    let mut time_gradient = 0.0;
    let mut remaining = 1.0;
    for i in 0..levels {
        let weight = if i + 1 < levels {
            let weight = remaining * weights.get(i).copied().unwrap_or(DEFAULT_TIME_GRADIENT_WEIGHT);
            remaining -= weight;
            weight
        } else {
            let weight = remaining;
            remaining = 0.0;
            weight
        };
        if score[i] > end[i] {
            return (time_gradient + weight + remaining).min(1.0);
        }
        if score[i] < start[i] {
            return time_gradient;
        }
        let level_gradient = if score[i] >= end[i] {
            1.0
        } else {
            (score[i] - start[i]) / (end[i] - start[i])
        };
        time_gradient += level_gradient * weight;
    }
    time_gradient.min(1.0)
}
