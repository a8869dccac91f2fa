//! Solution and class descriptors.

use std::any::TypeId;
use std::fmt;

use super::extractor::{ClassExtractor, TypedClassExtractor};
use super::DomainObject;

/// Role a class plays in the planning solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// A planning entity with one or more planning variables.
    Entity,
    /// Immutable input data.
    ProblemFact,
    /// An element of a planning list variable.
    ListValue,
}

impl ClassKind {
    /// Whether instances of this kind can be unassigned.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, ClassKind::ProblemFact)
    }
}

/// Describes one domain class of a solution at runtime.
pub struct ClassDescriptor<S> {
    /// Short name of the class type.
    pub type_name: &'static str,
    /// TypeId of the class type.
    pub type_id: TypeId,
    pub kind: ClassKind,
    extractor: Box<dyn ClassExtractor<S>>,
}

impl<S> ClassDescriptor<S> {
    pub fn count(&self, solution: &S) -> usize {
        self.extractor.count(solution)
    }

    pub fn snapshot(&self, solution: &S, index: usize) -> Option<std::sync::Arc<dyn DomainObject>> {
        self.extractor.snapshot(solution, index)
    }

    pub fn is_assigned(&self, solution: &S, index: usize) -> bool {
        self.extractor.is_assigned(solution, index)
    }
}

impl<S> fmt::Debug for ClassDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Describes a planning solution at runtime.
///
/// The descriptor lists every class that constraint streams may select
/// from, and derives the default constraint package from the module path
/// of the solution type.
///
/// # Example
///
/// ```
/// use scoreforge_core::{ClassKind, SolutionDescriptor};
///
/// #[derive(Clone, Debug)]
/// struct Lesson { room: Option<usize> }
///
/// #[derive(Clone, Debug)]
/// struct Room { id: usize }
///
/// struct Timetable { lessons: Vec<Lesson>, rooms: Vec<Room> }
///
/// let descriptor = SolutionDescriptor::<Timetable>::of()
///     .with_entity::<Lesson>(|s| &s.lessons, |_, l| l.room.is_some())
///     .with_problem_fact::<Room>(|s| &s.rooms);
///
/// assert_eq!(descriptor.type_name, "Timetable");
/// assert_eq!(descriptor.class_of::<Lesson>().unwrap().kind, ClassKind::Entity);
/// assert!(descriptor.class_of::<String>().is_none());
/// ```
pub struct SolutionDescriptor<S> {
    /// Short name of the solution type.
    pub type_name: &'static str,
    /// Package used for constraints that do not name one.
    pub constraint_package: String,
    classes: Vec<ClassDescriptor<S>>,
}

impl<S: Send + Sync + 'static> SolutionDescriptor<S> {
    /// Creates a descriptor named after `S`.
    pub fn of() -> Self {
        let full = std::any::type_name::<S>();
        let (package, name) = split_type_path(full);
        SolutionDescriptor {
            type_name: name,
            constraint_package: package.to_string(),
            classes: Vec::new(),
        }
    }

    /// Overrides the default constraint package.
    pub fn with_constraint_package(mut self, package: impl Into<String>) -> Self {
        self.constraint_package = package.into();
        self
    }

    /// Registers a planning entity class.
    pub fn with_entity<E: DomainObject + Clone>(
        self,
        get_collection: fn(&S) -> &Vec<E>,
        is_assigned: fn(&S, &E) -> bool,
    ) -> Self {
        let extractor = TypedClassExtractor::new(get_collection).with_assignment(is_assigned);
        self.with_class::<E>(ClassKind::Entity, Box::new(extractor))
    }

    /// Registers a problem fact class.
    pub fn with_problem_fact<E: DomainObject + Clone>(self, get_collection: fn(&S) -> &Vec<E>) -> Self {
        let extractor = TypedClassExtractor::new(get_collection);
        self.with_class::<E>(ClassKind::ProblemFact, Box::new(extractor))
    }

    /// Registers the element class of a planning list variable.
    pub fn with_list_value<E: DomainObject + Clone>(
        self,
        get_collection: fn(&S) -> &Vec<E>,
        is_assigned: fn(&S, &E) -> bool,
    ) -> Self {
        let extractor = TypedClassExtractor::new(get_collection).with_assignment(is_assigned);
        self.with_class::<E>(ClassKind::ListValue, Box::new(extractor))
    }

    /// Registers a class with a custom extractor.
    pub fn with_class<E: 'static>(
        mut self,
        kind: ClassKind,
        extractor: Box<dyn ClassExtractor<S>>,
    ) -> Self {
        let type_id = TypeId::of::<E>();
        let descriptor = ClassDescriptor {
            type_name: split_type_path(std::any::type_name::<E>()).1,
            type_id,
            kind,
            extractor,
        };
        match self.class_index(type_id) {
            Some(index) => self.classes[index] = descriptor,
            None => self.classes.push(descriptor),
        }
        self
    }
}

impl<S> SolutionDescriptor<S> {
    /// Returns the position of the class with the given TypeId.
    pub fn class_index(&self, type_id: TypeId) -> Option<usize> {
        self.classes.iter().position(|c| c.type_id == type_id)
    }

    pub fn class_of<E: 'static>(&self) -> Option<&ClassDescriptor<S>> {
        self.class_index(TypeId::of::<E>())
            .map(|index| &self.classes[index])
    }

    pub fn class(&self, index: usize) -> &ClassDescriptor<S> {
        &self.classes[index]
    }

    pub fn classes(&self) -> &[ClassDescriptor<S>] {
        &self.classes
    }

    /// Comma separated names of all registered classes.
    pub fn class_names(&self) -> String {
        self.classes
            .iter()
            .map(|c| c.type_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("constraint_package", &self.constraint_package)
            .field("classes", &self.classes)
            .finish()
    }
}

/// Splits `a::b::Type<X>` into (`a::b`, `Type<X>`).
pub(super) fn split_type_path(full: &'static str) -> (&'static str, &'static str) {
    let path_end = full.find('<').unwrap_or(full.len());
    match full[..path_end].rfind("::") {
        Some(pos) => (&full[..pos], &full[pos + 2..]),
        None => ("", full),
    }
}
