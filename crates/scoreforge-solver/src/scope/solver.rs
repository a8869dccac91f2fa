//! Solver-level scope.

use std::sync::Arc;
use std::time::Duration;

use scoreforge_core::Score;

use crate::clock::{Clock, SystemClock};

/// Top-level scope for the entire solving process.
pub struct SolverScope<Sc: Score> {
    clock: Arc<dyn Clock>,
    start_time: Option<Duration>,
    end_time: Option<Duration>,
    starting_initialized_score: Option<Sc>,
    best_score: Option<Sc>,
    best_score_time: Option<Duration>,
    total_step_count: u64,
    score_calculation_count: u64,
    move_evaluation_count: u64,
}

impl<Sc: Score> SolverScope<Sc> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            start_time: None,
            end_time: None,
            starting_initialized_score: None,
            best_score: None,
            best_score_time: None,
            total_step_count: 0,
            score_calculation_count: 0,
            move_evaluation_count: 0,
        }
    }

    /// Marks the start of solving. `starting_score` becomes the best score.
    pub fn start_solving(&mut self, starting_score: Option<Sc>) {
        let now = self.clock.now();
        self.start_time = Some(now);
        self.end_time = None;
        self.starting_initialized_score = starting_score;
        self.best_score = starting_score;
        self.best_score_time = Some(now);
        self.total_step_count = 0;
        self.score_calculation_count = 0;
        self.move_evaluation_count = 0;
    }

    pub fn end_solving(&mut self) {
        self.end_time = Some(self.clock.now());
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current reading of the scope's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn start_time(&self) -> Option<Duration> {
        self.start_time
    }

    /// Time spent solving; frozen once solving ended.
    pub fn time_spent(&self) -> Duration {
        let Some(start) = self.start_time else {
            return Duration::ZERO;
        };
        let end = self.end_time.unwrap_or_else(|| self.clock.now());
        end.saturating_sub(start)
    }

    pub fn starting_initialized_score(&self) -> Option<&Sc> {
        self.starting_initialized_score.as_ref()
    }

    pub fn best_score(&self) -> Option<&Sc> {
        self.best_score.as_ref()
    }

    /// Clock reading at which the current best score was found.
    pub fn best_score_time(&self) -> Option<Duration> {
        self.best_score_time
    }

    /// Records `score` as the best score if it improves on the current one.
    ///
    /// Returns true if the best score changed.
    pub fn update_best_score(&mut self, score: Sc) -> bool {
        let improved = self.best_score.map_or(true, |best| score > best);
        if improved {
            self.best_score = Some(score);
            self.best_score_time = Some(self.clock.now());
            if self.starting_initialized_score.is_none() {
                self.starting_initialized_score = Some(score);
            }
        }
        improved
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    pub(crate) fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.total_step_count
    }

    pub fn score_calculation_count(&self) -> u64 {
        self.score_calculation_count
    }

    pub fn add_score_calculation_count(&mut self, count: u64) {
        self.score_calculation_count += count;
    }

    pub fn move_evaluation_count(&self) -> u64 {
        self.move_evaluation_count
    }

    pub fn add_move_evaluation_count(&mut self, count: u64) {
        self.move_evaluation_count += count;
    }
}

impl<Sc: Score> Default for SolverScope<Sc> {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}
