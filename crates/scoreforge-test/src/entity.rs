//! Generic entity test fixtures.
//!
//! A solution with planning entities that belong to a group and have one
//! planning variable, plus the values and groups as problem facts.
//!
//! # Example
//!
//! ```
//! use scoreforge_test::entity::{descriptor, TestSolution};
//!
//! let solution = TestSolution::generate(2, 3, 5);
//! assert_eq!(solution.entities.len(), 5);
//! assert_eq!(solution.entities[4].group, "Generated Group 1");
//! assert_eq!(descriptor().classes().len(), 3);
//! ```

use scoreforge_core::{PlanningSolution, SimpleScore, SolutionDescriptor};

/// Class index of [`TestEntity`] in [`descriptor`].
pub const ENTITY_CLASS: usize = 0;
/// Class index of [`TestValue`] in [`descriptor`].
pub const VALUE_CLASS: usize = 1;
/// Class index of [`TestEntityGroup`] in [`descriptor`].
pub const GROUP_CLASS: usize = 2;

/// A value a [`TestEntity`] can be assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestValue {
    pub code: String,
}

impl TestValue {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// A group of entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestEntityGroup {
    pub code: String,
}

impl TestEntityGroup {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// A planning entity with one planning variable, `value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestEntity {
    pub code: String,
    pub group: String,
    pub value: Option<String>,
    pub integer_property: i32,
}

impl TestEntity {
    /// Creates an entity with an assigned value.
    pub fn assigned(code: impl Into<String>, group: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            group: group.into(),
            value: Some(value.into()),
            integer_property: 1,
        }
    }

    /// Creates an entity with no value assigned.
    pub fn unassigned(code: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            group: group.into(),
            value: None,
            integer_property: 1,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.value.is_some()
    }
}

/// A test solution with entities, values and groups.
#[derive(Clone, Debug, Default)]
pub struct TestSolution {
    pub entities: Vec<TestEntity>,
    pub values: Vec<TestValue>,
    pub groups: Vec<TestEntityGroup>,
    pub score: Option<SimpleScore>,
}

impl TestSolution {
    /// Creates an empty test solution.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a solution where entity `i` belongs to group `i % group_count`
    /// and is assigned to value `i % value_count`.
    pub fn generate(value_count: usize, group_count: usize, entity_count: usize) -> Self {
        let values: Vec<_> = (0..value_count)
            .map(|i| TestValue::new(format!("Generated Value {i}")))
            .collect();
        let groups: Vec<_> = (0..group_count)
            .map(|i| TestEntityGroup::new(format!("Generated Group {i}")))
            .collect();
        let entities = (0..entity_count)
            .map(|i| {
                TestEntity::assigned(
                    format!("Generated Entity {i}"),
                    groups[i % group_count].code.clone(),
                    values[i % value_count].code.clone(),
                )
            })
            .collect();
        Self {
            entities,
            values,
            groups,
            score: None,
        }
    }

    /// Creates a test solution with the given entities.
    pub fn with_entities(entities: Vec<TestEntity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    /// Position of the entity with the given code.
    pub fn entity_index(&self, code: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.code == code)
    }
}

impl PlanningSolution for TestSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Creates the SolutionDescriptor of [`TestSolution`].
pub fn descriptor() -> SolutionDescriptor<TestSolution> {
    SolutionDescriptor::<TestSolution>::of()
        .with_constraint_package("scoreforge/test")
        .with_entity::<TestEntity>(|s| &s.entities, |_, e| e.is_assigned())
        .with_problem_fact::<TestValue>(|s| &s.values)
        .with_problem_fact::<TestEntityGroup>(|s| &s.groups)
}
