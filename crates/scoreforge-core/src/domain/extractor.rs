//! Extractors for reading domain class instances out of a solution.

use std::marker::PhantomData;
use std::sync::Arc;

use super::DomainObject;

/// Reads the instances of one domain class from a solution of type `S`.
///
/// Instances are addressed by their position in the solution's collection.
pub trait ClassExtractor<S>: Send + Sync {
    /// Returns the number of instances in the collection.
    fn count(&self, solution: &S) -> usize;

    /// Clones the instance at `index` into a shared, type-erased snapshot.
    fn snapshot(&self, solution: &S, index: usize) -> Option<Arc<dyn DomainObject>>;

    /// Returns whether the instance at `index` is currently assigned.
    ///
    /// Classes without a planning variable are always assigned.
    fn is_assigned(&self, solution: &S, index: usize) -> bool;
}

/// A concrete extractor over a `Vec<E>` field of the solution.
///
/// # Type Parameters
/// * `S` - The solution type
/// * `E` - The class type
pub struct TypedClassExtractor<S, E> {
    get_collection: fn(&S) -> &Vec<E>,
    is_assigned: Option<fn(&S, &E) -> bool>,
    _phantom: PhantomData<fn() -> E>,
}

impl<S, E> TypedClassExtractor<S, E> {
    pub fn new(get_collection: fn(&S) -> &Vec<E>) -> Self {
        Self {
            get_collection,
            is_assigned: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the predicate deciding whether an instance is assigned.
    ///
    /// For a basic planning variable this is usually "the variable is set";
    /// for a list value it is "some entity's list contains it".
    pub fn with_assignment(mut self, is_assigned: fn(&S, &E) -> bool) -> Self {
        self.is_assigned = Some(is_assigned);
        self
    }
}

impl<S, E> ClassExtractor<S> for TypedClassExtractor<S, E>
where
    S: Send + Sync + 'static,
    E: DomainObject + Clone,
{
    fn count(&self, solution: &S) -> usize {
        (self.get_collection)(solution).len()
    }

    fn snapshot(&self, solution: &S, index: usize) -> Option<Arc<dyn DomainObject>> {
        (self.get_collection)(solution)
            .get(index)
            .map(|e| Arc::new(e.clone()) as Arc<dyn DomainObject>)
    }

    fn is_assigned(&self, solution: &S, index: usize) -> bool {
        match (self.is_assigned, (self.get_collection)(solution).get(index)) {
            (Some(predicate), Some(e)) => predicate(solution, e),
            _ => true,
        }
    }
}
