//! Scope hierarchy for solver execution.
//!
//! Scopes maintain the progress terminations read at different levels:
//! - [`SolverScope`]: Top-level, holds the clock, best score and counters
//! - [`PhaseScope`]: Per-phase state
//! - [`StepScope`]: Per-step state within a phase
//!
//! Scopes are owned by the solving thread; none of them are shared.

mod phase;
mod solver;
mod step;

pub use phase::{PhaseKind, PhaseScope};
pub use solver::SolverScope;
pub use step::StepScope;
