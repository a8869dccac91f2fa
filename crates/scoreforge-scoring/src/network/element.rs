//! Elements: the values a tuple is made of.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use scoreforge_core::DomainObject;
use smallvec::SmallVec;

/// Identity of one domain instance for the lifetime of a score director.
pub type FactId = u64;

/// The ordered elements of one tuple.
pub type Facts = SmallVec<[Element; 4]>;

/// A snapshot of one entity, problem fact or list value.
///
/// Equality and hashing use the id only: two snapshots of the same
/// instance taken before and after a change are the same fact.
#[derive(Clone)]
pub struct FactHandle {
    id: FactId,
    object: Arc<dyn DomainObject>,
    assigned: bool,
}

impl FactHandle {
    pub fn new(id: FactId, object: Arc<dyn DomainObject>, assigned: bool) -> Self {
        Self {
            id,
            object,
            assigned,
        }
    }

    #[inline]
    pub fn id(&self) -> FactId {
        self.id
    }

    /// Whether the instance's planning variable was set when snapshotted.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    pub fn object(&self) -> &dyn DomainObject {
        &*self.object
    }
}

/// A hashable value derived from facts by a mapping, grouping or collector.
///
/// Implemented for every domain object that is `Eq + Hash`.
pub trait ValueObject: DomainObject {
    fn dyn_eq(&self, other: &dyn ValueObject) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn as_domain(&self) -> &dyn DomainObject;
}

impl<T: DomainObject + Eq + Hash> ValueObject for T {
    fn dyn_eq(&self, other: &dyn ValueObject) -> bool {
        other
            .as_domain()
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|o| o == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn as_domain(&self) -> &dyn DomainObject {
        self
    }
}

/// One element of a tuple.
///
/// Facts come straight from the working solution. Values are computed by
/// `map`, `group_by` and collectors and compare by value.
#[derive(Clone)]
pub enum Element {
    Fact(FactHandle),
    Value(Arc<dyn ValueObject>),
}

impl Element {
    /// Wraps a computed value.
    pub fn value<T: DomainObject + Eq + Hash>(value: T) -> Self {
        Element::Value(Arc::new(value))
    }

    /// Borrows the element as `T`.
    ///
    /// # Panics
    /// Panics if the element holds another type. Streams are typed, so this
    /// only happens when a node is wired to the wrong parent.
    pub fn get<T: 'static>(&self) -> &T {
        match self.try_get::<T>() {
            Some(value) => value,
            None => panic!(
                "Tuple element {:?} is not a {}",
                self,
                std::any::type_name::<T>()
            ),
        }
    }

    pub fn try_get<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn as_any(&self) -> &dyn Any {
        self.object().as_any()
    }

    pub fn object(&self) -> &dyn DomainObject {
        match self {
            Element::Fact(handle) => handle.object(),
            Element::Value(value) => (**value).as_domain(),
        }
    }

    pub fn as_fact(&self) -> Option<&FactHandle> {
        match self {
            Element::Fact(handle) => Some(handle),
            Element::Value(_) => None,
        }
    }

    /// Whether `other` carries the same snapshot, not merely the same fact.
    ///
    /// Facts must share both id and object; values compare by value.
    pub fn same_snapshot(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Fact(a), Element::Fact(b)) => {
                a.id == b.id && a.assigned == b.assigned && Arc::ptr_eq(&a.object, &b.object)
            }
            _ => self == other,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Fact(a), Element::Fact(b)) => a.id == b.id,
            (Element::Value(a), Element::Value(b)) => (**a).dyn_eq(&**b),
            _ => false,
        }
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Element::Fact(handle) => {
                0u8.hash(state);
                handle.id.hash(state);
            }
            Element::Value(value) => {
                1u8.hash(state);
                (**value).dyn_hash(state);
            }
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.object(), f)
    }
}
