//! Fluent constraint stream API.
//!
//! Constraints are declared as pipelines over the solution's classes:
//!
//! ```text
//! factory.for_each::<Shift>()                 -> UniStream<Shift>
//!     .join(equal_bi(..))                     -> BiStream<Shift, Employee>
//!     .filter(|shift, employee| ..)           -> BiStream<Shift, Employee>
//!     .penalize(HardSoftScore::ONE_HARD)      -> BiConstraintBuilder
//!     .as_constraint("Unavailable employee")  -> Constraint
//! ```
//!
//! Streams only describe the computation. Each operation records a node in
//! the factory's plan; operations with the same parent node and the same
//! function instances resolve to one node, so constraints that start the
//! same way share their common prefix. A session factory later turns the
//! plan into an incremental network.

#[macro_use]
mod arity_stream_macros;

mod bi_stream;
pub mod collector;
mod factory;
pub(crate) mod function;
pub mod joiner;
mod quad_stream;
mod tri_stream;
mod uni_stream;


pub use bi_stream::{BiConstraintBuilder, BiStream};
pub use factory::ConstraintFactory;
pub(crate) use factory::{NodeTemplate, Plan};
pub use function::{JoinPredicate, Shared, Token, TupleFn};
pub use joiner::Joiner;
pub use quad_stream::{QuadConstraintBuilder, QuadStream};
pub use tri_stream::{TriConstraintBuilder, TriStream};
pub use uni_stream::{UniConstraintBuilder, UniStream};
