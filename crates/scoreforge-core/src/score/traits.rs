//! The `Score` and `ParseableScore` traits

use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use thiserror::Error;

/// A totally ordered measure of solution quality.
///
/// Levels are compared from the highest priority down; a higher score is
/// better. Scores are plain values: constraint impacts are added and
/// subtracted, and a constraint weight is scaled per match with
/// [`multiply_by`](Score::multiply_by).
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Numeric type a constraint weight is multiplied by for one match.
    ///
    /// Always the score's own level type, so weight arithmetic never
    /// passes through a narrower or lossy representation.
    type Multiplier: Copy + Debug + Send + Sync + 'static;

    fn zero() -> Self;

    fn is_feasible(&self) -> bool;

    fn levels_count() -> usize;

    /// Number of leading levels that decide feasibility.
    ///
    /// Zero for single-level scores, which are always feasible.
    fn feasible_levels_count() -> usize;

    /// Level values from highest to lowest priority.
    ///
    /// Only gradient and improvement-ratio calculations read these, and
    /// they tolerate the precision loss.
    fn to_level_numbers(&self) -> Vec<f64>;

    fn multiply_by(&self, multiplier: Self::Multiplier) -> Self;
}

/// A score with a textual form, as used in configuration.
///
/// - `SimpleScore`: `42`
/// - `SimpleDecimalScore`: `-1.25`
/// - `HardSoftScore`: `0hard/-100soft`
pub trait ParseableScore: Score {
    fn parse(text: &str) -> Result<Self, ScoreParseError>;

    fn to_string_repr(&self) -> String;
}

/// Why a score text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreParseError {
    #[error("{score_type} text ({text}) must have {expected} levels separated by '/'")]
    LevelCount {
        score_type: &'static str,
        text: String,
        expected: usize,
    },

    #[error("level ({text}) must end with the label '{label}'")]
    MissingLabel { text: String, label: &'static str },

    #[error("level ({text}) is not a number: {reason}")]
    InvalidNumber { text: String, reason: String },
}
