//! Solver and phase terminations wired together.

use scoreforge_core::Score;

use super::{TerminateEarlyHandle, Termination, UNSUPPORTED_TIME_GRADIENT};
use crate::scope::{PhaseScope, SolverScope, StepScope};

/// The solver termination plus one optional termination per phase.
///
/// A phase stops when its own termination says so or when the solver
/// termination does, so a phase never outlives the solver. Lifecycle
/// events reach the solver termination and the termination of the phase
/// they belong to.
#[derive(Debug)]
pub struct TerminationHierarchy<Sc: Score> {
    solver: Box<dyn Termination<Sc>>,
    phases: Vec<Option<Box<dyn Termination<Sc>>>>,
    handle: TerminateEarlyHandle,
}

impl<Sc: Score> TerminationHierarchy<Sc> {
    /// `handle` must be the one observed by `solver`.
    pub fn new(
        solver: Box<dyn Termination<Sc>>,
        phases: Vec<Option<Box<dyn Termination<Sc>>>>,
        handle: TerminateEarlyHandle,
    ) -> Self {
        Self {
            solver,
            phases,
            handle,
        }
    }

    /// Handle that stops solving from any thread.
    pub fn terminate_early_handle(&self) -> TerminateEarlyHandle {
        self.handle.clone()
    }

    pub fn solver_termination(&self) -> &dyn Termination<Sc> {
        self.solver.as_ref()
    }

    pub fn phase_termination(&self, phase_index: usize) -> Option<&dyn Termination<Sc>> {
        self.phases.get(phase_index)?.as_deref()
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        self.solver.is_solver_terminated(solver_scope)
    }

    pub fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        if self.solver.is_solver_terminated(phase_scope.solver_scope()) {
            return true;
        }
        self.phase_termination(phase_scope.phase_index())
            .is_some_and(|termination| termination.is_phase_terminated(phase_scope))
    }

    pub fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        self.solver.calculate_solver_time_gradient(solver_scope)
    }

    /// Highest supported gradient of the phase and solver terminations.
    pub fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        let solver_gradient = self
            .solver
            .calculate_solver_time_gradient(phase_scope.solver_scope());
        let phase_gradient = self
            .phase_termination(phase_scope.phase_index())
            .map_or(UNSUPPORTED_TIME_GRADIENT, |termination| {
                termination.calculate_phase_time_gradient(phase_scope)
            });
        [solver_gradient, phase_gradient]
            .into_iter()
            .filter(|gradient| *gradient >= 0.0)
            .fold(0.0, f64::max)
    }

    fn phase_mut(&mut self, phase_index: usize) -> Option<&mut Box<dyn Termination<Sc>>> {
        self.phases.get_mut(phase_index)?.as_mut()
    }

    pub fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
        self.solver.solving_started(solver_scope);
    }

    pub fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.solver.phase_started(phase_scope);
        if let Some(termination) = self.phase_mut(phase_scope.phase_index()) {
            termination.phase_started(phase_scope);
        }
    }

    pub fn step_started(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        self.solver.step_started(step_scope);
        if let Some(termination) = self.phase_mut(step_scope.phase_scope().phase_index()) {
            termination.step_started(step_scope);
        }
    }

    pub fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
        self.solver.step_ended(step_scope);
        if let Some(termination) = self.phase_mut(step_scope.phase_scope().phase_index()) {
            termination.step_ended(step_scope);
        }
    }

    pub fn phase_ended(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
        self.solver.phase_ended(phase_scope);
        if let Some(termination) = self.phase_mut(phase_scope.phase_index()) {
            termination.phase_ended(phase_scope);
        }
    }

    pub fn solving_ended(&mut self, solver_scope: &SolverScope<Sc>) {
        self.solver.solving_ended(solver_scope);
    }
}
