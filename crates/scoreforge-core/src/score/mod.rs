//! Score types for representing solution quality
//!
//! Scores are used to compare solutions and to accumulate constraint impacts.
//! All score types are immutable values with arithmetic in their own numeric type.

#[macro_use]
mod macros;
mod hard_soft;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use hard_soft::HardSoftScore;
pub use simple::{SimpleDecimalScore, SimpleLongScore, SimpleScore};
pub use traits::{ParseableScore, Score, ScoreParseError};
