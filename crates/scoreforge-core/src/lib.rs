//! ScoreForge Core - Core types and traits for incremental scoring
//!
//! This crate provides the fundamental abstractions for ScoreForge:
//! - Score types for representing solution quality
//! - Domain traits and descriptors for planning problems
//! - Constraint identity types

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{compose_constraint_id, ConstraintRef, ImpactType};
pub use domain::{
    ClassDescriptor, ClassKind, DomainObject, PlanningSolution, SolutionDescriptor,
};
pub use error::{Result, SolverForgeError};
pub use score::{
    HardSoftScore, ParseableScore, Score, ScoreParseError, SimpleDecimalScore,
    SimpleLongScore, SimpleScore,
};
