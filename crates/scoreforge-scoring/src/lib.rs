//! Incremental constraint stream scoring for ScoreForge.
//!
//! This crate provides the incremental scoring infrastructure:
//! - A fluent constraint stream API (`ConstraintFactory`, `UniStream`, ...)
//! - A node-sharing compiler turning constraint definitions into one network
//! - An incremental tuple network (`network`)
//! - Score directors translating solution changes into network changes
//! - Score analysis: constraint match totals, justifications, indictments
//!
//! # Architecture
//!
//! Constraint definitions are compiled once per [`ConstraintSessionFactory`].
//! Every [`ConstraintSession`] owns a private network instantiated from the
//! compiled plan; sessions share no mutable state.

// Erased closures intentionally use complex types
#![allow(clippy::type_complexity)]

// Core modules
pub mod api;
pub mod constraint;
pub mod director;
pub mod network;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_utils;

// ============================================================================
// Constraints
// ============================================================================

pub use constraint::{Constraint, ConstraintProvider};

// ============================================================================
// Sessions
// ============================================================================

pub use api::constraint_set::{ConstraintSession, ConstraintSessionFactory};
pub use api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};

// ============================================================================
// Score Directors
// ============================================================================

pub use director::{
    IncrementalScoreDirector, ScoreDirector, ScoreDirectorFactory, SimpleScoreDirector,
};

// ============================================================================
// Analysis (for score explanation)
// ============================================================================

pub use api::analysis::{
    ConstraintJustification, ConstraintMatch, ConstraintMatchPolicy, ConstraintMatchTotal,
    DefaultConstraintJustification, Indictment, IndictmentMap, ScoreExplanation,
};

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::{
    BiConstraintBuilder, BiStream, ConstraintFactory, Joiner, QuadConstraintBuilder, QuadStream,
    Shared, TriConstraintBuilder, TriStream, UniConstraintBuilder, UniStream,
};
pub use stream::collector;
pub use stream::joiner;
