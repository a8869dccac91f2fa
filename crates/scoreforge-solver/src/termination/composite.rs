//! Composite termination conditions (AND/OR).
//!
//! Children are held in a [`TerminationList`]: a tuple of concrete
//! terminations for statically built trees, or a `Vec` of boxed ones for
//! trees built from configuration.

use std::fmt::Debug;

use scoreforge_core::Score;

use super::{Termination, TerminationKind};
use crate::scope::{PhaseScope, SolverScope, StepScope};

/// The children of a composite termination.
pub trait TerminationList<Sc: Score>: Send + Debug {
    fn for_each(&self, visit: &mut dyn FnMut(&dyn Termination<Sc>));

    fn for_each_mut(&mut self, visit: &mut dyn FnMut(&mut dyn Termination<Sc>));
}

/// Generates `TerminationList` implementations for tuples.
macro_rules! impl_termination_list {
    ($($idx:tt: $T:ident),+) => {
        impl<Sc, $($T),+> TerminationList<Sc> for ($($T,)+)
        where
            Sc: Score,
            $($T: Termination<Sc>,)+
        {
            fn for_each(&self, visit: &mut dyn FnMut(&dyn Termination<Sc>)) {
                $(visit(&self.$idx);)+
            }

            fn for_each_mut(&mut self, visit: &mut dyn FnMut(&mut dyn Termination<Sc>)) {
                $(visit(&mut self.$idx);)+
            }
        }
    };
}

impl_termination_list!(0: T0);
impl_termination_list!(0: T0, 1: T1);
impl_termination_list!(0: T0, 1: T1, 2: T2);
impl_termination_list!(0: T0, 1: T1, 2: T2, 3: T3);
impl_termination_list!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_termination_list!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
impl_termination_list!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6);
impl_termination_list!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7);

impl<Sc: Score> TerminationList<Sc> for Vec<Box<dyn Termination<Sc>>> {
    fn for_each(&self, visit: &mut dyn FnMut(&dyn Termination<Sc>)) {
        for termination in self {
            visit(termination);
        }
    }

    fn for_each_mut(&mut self, visit: &mut dyn FnMut(&mut dyn Termination<Sc>)) {
        for termination in self {
            visit(termination);
        }
    }
}

/// Generates the lifecycle forwarding shared by both composites.
macro_rules! forward_lifecycle {
    () => {
        fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Termination<Sc>)) {
            self.0.for_each(visit);
        }

        fn solving_started(&mut self, solver_scope: &SolverScope<Sc>) {
            self.0.for_each_mut(&mut |child: &mut dyn Termination<Sc>| {
                child.solving_started(solver_scope)
            });
        }

        fn phase_started(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
            self.0.for_each_mut(&mut |child: &mut dyn Termination<Sc>| {
                child.phase_started(phase_scope)
            });
        }

        fn step_started(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
            self.0.for_each_mut(&mut |child: &mut dyn Termination<Sc>| {
                child.step_started(step_scope)
            });
        }

        fn step_ended(&mut self, step_scope: &StepScope<'_, '_, Sc>) {
            self.0.for_each_mut(&mut |child: &mut dyn Termination<Sc>| {
                child.step_ended(step_scope)
            });
        }

        fn phase_ended(&mut self, phase_scope: &PhaseScope<'_, Sc>) {
            self.0.for_each_mut(&mut |child: &mut dyn Termination<Sc>| {
                child.phase_ended(phase_scope)
            });
        }

        fn solving_ended(&mut self, solver_scope: &SolverScope<Sc>) {
            self.0.for_each_mut(&mut |child: &mut dyn Termination<Sc>| {
                child.solving_ended(solver_scope)
            });
        }
    };
}

/// Combines multiple terminations with OR logic (any must terminate).
///
/// The time gradient is the highest supported child gradient.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use scoreforge_core::SimpleScore;
/// use scoreforge_solver::termination::{
///     OrTermination, StepCountTermination, Termination, TimeSpentTermination,
/// };
///
/// // Terminate after 30 seconds OR 1000 steps
/// let termination = OrTermination((
///     TimeSpentTermination::new(Duration::from_secs(30)),
///     StepCountTermination::new(1000),
/// ));
/// let _: &dyn Termination<SimpleScore> = &termination;
/// ```
#[derive(Debug)]
pub struct OrTermination<T>(pub T);

impl<T> OrTermination<T> {
    /// Creates a new OR termination from a list of terminations.
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

impl<Sc: Score, T: TerminationList<Sc>> Termination<Sc> for OrTermination<T> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::Or
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        let mut terminated = false;
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            terminated = terminated || child.is_solver_terminated(solver_scope);
        });
        terminated
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        let mut terminated = false;
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            terminated = terminated || child.is_phase_terminated(phase_scope);
        });
        terminated
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        let mut gradients = Vec::new();
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            gradients.push(child.calculate_solver_time_gradient(solver_scope));
        });
        max_supported(&gradients)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        let mut gradients = Vec::new();
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            gradients.push(child.calculate_phase_time_gradient(phase_scope));
        });
        max_supported(&gradients)
    }

    forward_lifecycle!();
}

/// Combines multiple terminations with AND logic (all must terminate).
///
/// The time gradient is the lowest supported child gradient.
///
/// # Examples
///
/// ```
/// use scoreforge_core::HardSoftScore;
/// use scoreforge_solver::termination::{
///     AndTermination, BestScoreFeasibleTermination, StepCountTermination, Termination,
/// };
///
/// // Terminate only when BOTH score is feasible AND 100 steps passed
/// let termination = AndTermination((
///     BestScoreFeasibleTermination::new::<HardSoftScore>(),
///     StepCountTermination::new(100),
/// ));
/// let _: &dyn Termination<HardSoftScore> = &termination;
/// ```
#[derive(Debug)]
pub struct AndTermination<T>(pub T);

impl<T> AndTermination<T> {
    /// Creates a new AND termination from a list of terminations.
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

impl<Sc: Score, T: TerminationList<Sc>> Termination<Sc> for AndTermination<T> {
    fn kind(&self) -> TerminationKind {
        TerminationKind::And
    }

    fn is_solver_terminated(&self, solver_scope: &SolverScope<Sc>) -> bool {
        let mut terminated = true;
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            terminated = terminated && child.is_solver_terminated(solver_scope);
        });
        terminated
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, Sc>) -> bool {
        let mut terminated = true;
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            terminated = terminated && child.is_phase_terminated(phase_scope);
        });
        terminated
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<Sc>) -> f64 {
        let mut gradients = Vec::new();
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            gradients.push(child.calculate_solver_time_gradient(solver_scope));
        });
        min_supported(&gradients)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, Sc>) -> f64 {
        let mut gradients = Vec::new();
        self.0.for_each(&mut |child: &dyn Termination<Sc>| {
            gradients.push(child.calculate_phase_time_gradient(phase_scope));
        });
        min_supported(&gradients)
    }

    forward_lifecycle!();
}

// Unsupported gradients are negative and ignored.
fn max_supported(gradients: &[f64]) -> f64 {
    gradients
        .iter()
        .copied()
        .filter(|gradient| *gradient >= 0.0)
        .fold(0.0, f64::max)
}

fn min_supported(gradients: &[f64]) -> f64 {
    gradients
        .iter()
        .copied()
        .filter(|gradient| *gradient >= 0.0)
        .fold(1.0, f64::min)
}
