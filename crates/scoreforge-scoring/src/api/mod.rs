//! Session-level constraint API.
//!
//! This module provides:
//! - `ConstraintSessionFactory` and `ConstraintSession` for incremental scoring
//! - Analysis types for score explanation
//! - Runtime weight override configuration

pub mod analysis;
pub mod constraint_set;
pub mod weight_overrides;

#[cfg(test)]
mod tests;

pub use analysis::{
    ConstraintJustification, ConstraintMatch, ConstraintMatchPolicy, ConstraintMatchTotal,
    DefaultConstraintJustification, Indictment, IndictmentMap, ScoreExplanation,
};
pub use constraint_set::{ConstraintSession, ConstraintSessionFactory};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};
