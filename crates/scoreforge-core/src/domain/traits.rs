//! Core domain traits

use std::any::Any;
use std::fmt::Debug;

use crate::score::Score;

/// The problem being solved together with its current assignment and score.
///
/// ```
/// use scoreforge_core::{HardSoftScore, PlanningSolution};
///
/// #[derive(Clone)]
/// struct Timetable {
///     lesson_rooms: Vec<Option<u32>>,
///     score: Option<HardSoftScore>,
/// }
///
/// impl PlanningSolution for Timetable {
///     type Score = HardSoftScore;
///
///     fn score(&self) -> Option<HardSoftScore> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<HardSoftScore>) {
///         self.score = score;
///     }
/// }
/// ```
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    type Score: Score;

    /// `None` until a score director has calculated it.
    fn score(&self) -> Option<Self::Score>;

    fn set_score(&mut self, score: Option<Self::Score>);
}

/// A type-erased domain value that can flow through a constraint network.
///
/// Implemented for every `'static` type that is `Debug + Send + Sync`.
///
/// Call through the trait object (`(*arc).as_any()`), since smart pointers
/// around a domain object are domain objects themselves.
pub trait DomainObject: Any + Debug + Send + Sync {
    /// Returns this object as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the concrete type name, for error messages.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + Send + Sync> DomainObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
