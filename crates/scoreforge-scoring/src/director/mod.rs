//! Score director implementations.
//!
//! The score director owns the working solution and keeps its score.
//!
//! # Score Director Types
//!
//! - [`IncrementalScoreDirector`] - Incremental scoring through a constraint session
//! - [`SimpleScoreDirector`] - Full recalculation (baseline)

mod change;
mod factory;
mod incremental;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use change::{Addition, ListVariableChange, Removal, VariableChange};
pub use factory::ScoreDirectorFactory;
pub use incremental::IncrementalScoreDirector;
pub use simple::SimpleScoreDirector;
pub use traits::ScoreDirector;
