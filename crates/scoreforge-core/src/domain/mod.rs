//! Domain model traits and runtime descriptors
//!
//! - `PlanningSolution`: the container for the complete problem and solution
//! - `DomainObject`: anything a constraint stream can carry as a fact
//! - `SolutionDescriptor`: runtime metadata listing the entity, problem fact
//!   and list value classes a solution exposes to constraint streams

mod descriptor;
mod extractor;
mod traits;

#[cfg(test)]
mod tests;

pub use descriptor::{ClassDescriptor, ClassKind, SolutionDescriptor};
pub use extractor::{ClassExtractor, TypedClassExtractor};
pub use traits::{DomainObject, PlanningSolution};
