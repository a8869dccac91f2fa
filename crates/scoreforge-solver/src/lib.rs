//! ScoreForge Solver Engine
//!
//! This crate provides the termination side of solving:
//! - Solver, phase and step scopes tracking progress
//! - Monotonic clocks, including a mock clock for tests
//! - Termination conditions and their AND/OR composition
//! - Building termination trees from configuration

pub mod clock;
pub mod scope;
pub mod termination;

pub use clock::{Clock, MockClock, SystemClock};
pub use scope::{PhaseKind, PhaseScope, SolverScope, StepScope};
pub use termination::{
    leaf_kinds, AdaptiveTermination, AndTermination, BasicPlumbingTermination,
    BestScoreFeasibleTermination, BestScoreTermination, DiminishedReturnsTermination,
    MoveCountTermination, OrTermination, ScoreCalculationCountTermination, StepCountTermination,
    TerminateEarlyHandle, Termination, TerminationFactory, TerminationHierarchy, TerminationKind,
    TerminationList, TimeSpentTermination, UnimprovedBestSolutionTermination,
    UnimprovedStepCountTermination, UnimprovedTimeSpentTermination, UNSUPPORTED_TIME_GRADIENT,
};
