//! List variable test fixtures.
//!
//! Each entity owns an ordered list of values; a value is assigned while
//! some entity's list contains it.

use scoreforge_core::{PlanningSolution, SimpleScore, SolutionDescriptor};

/// Class index of [`TestListEntity`] in [`list_descriptor`].
pub const LIST_ENTITY_CLASS: usize = 0;
/// Class index of [`TestListValue`] in [`list_descriptor`].
pub const LIST_VALUE_CLASS: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestListValue {
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestListEntity {
    pub code: String,
    /// Codes of the values in this entity's list.
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TestListSolution {
    pub entities: Vec<TestListEntity>,
    pub values: Vec<TestListValue>,
    pub score: Option<SimpleScore>,
}

impl TestListSolution {
    /// Creates `entity_count` entities with empty lists and `value_count`
    /// unassigned values.
    pub fn generate(entity_count: usize, value_count: usize) -> Self {
        Self {
            entities: (0..entity_count)
                .map(|i| TestListEntity {
                    code: format!("Generated Entity {i}"),
                    values: Vec::new(),
                })
                .collect(),
            values: (0..value_count)
                .map(|i| TestListValue {
                    code: format!("Generated Value {i}"),
                })
                .collect(),
            score: None,
        }
    }

    pub fn is_value_assigned(&self, value: &TestListValue) -> bool {
        self.entities.iter().any(|e| e.values.contains(&value.code))
    }
}

impl PlanningSolution for TestListSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Creates the SolutionDescriptor of [`TestListSolution`].
pub fn list_descriptor() -> SolutionDescriptor<TestListSolution> {
    SolutionDescriptor::<TestListSolution>::of()
        .with_constraint_package("scoreforge/test")
        .with_entity::<TestListEntity>(|s| &s.entities, |_, _| true)
        .with_list_value::<TestListValue>(|s| &s.values, |s, v| s.is_value_assigned(v))
}
