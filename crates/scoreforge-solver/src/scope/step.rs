//! Step-level scope.

use scoreforge_core::Score;

use super::PhaseScope;

/// Scope for a single step within a phase.
pub struct StepScope<'a, 'b, Sc: Score> {
    /// Reference to the parent phase scope.
    phase_scope: &'a mut PhaseScope<'b, Sc>,
    /// Index of this step within the phase (0-based).
    step_index: u64,
    /// Score after this step.
    step_score: Option<Sc>,
    best_score_improved: bool,
}

impl<'a, 'b, Sc: Score> StepScope<'a, 'b, Sc> {
    /// Creates a new step scope.
    pub fn new(phase_scope: &'a mut PhaseScope<'b, Sc>) -> Self {
        let step_index = phase_scope.step_count();
        Self {
            phase_scope,
            step_index,
            step_score: None,
            best_score_improved: false,
        }
    }

    /// Returns the step index within the phase.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Returns the step score.
    pub fn step_score(&self) -> Option<&Sc> {
        self.step_score.as_ref()
    }

    /// Sets the step score.
    pub fn set_step_score(&mut self, score: Sc) {
        self.step_score = Some(score);
    }

    /// True if completing this step produced a new best score.
    pub fn best_score_improved(&self) -> bool {
        self.best_score_improved
    }

    /// Marks this step as complete, increments counters and promotes the
    /// step score to best score when it improves on it.
    pub fn complete(&mut self) {
        self.phase_scope.increment_step_count();
        if let Some(score) = self.step_score {
            self.best_score_improved = self.phase_scope.solver_scope_mut().update_best_score(score);
        }
    }

    /// Returns a reference to the phase scope.
    pub fn phase_scope(&self) -> &PhaseScope<'b, Sc> {
        self.phase_scope
    }

    /// Returns a mutable reference to the phase scope.
    pub fn phase_scope_mut(&mut self) -> &mut PhaseScope<'b, Sc> {
        self.phase_scope
    }
}
