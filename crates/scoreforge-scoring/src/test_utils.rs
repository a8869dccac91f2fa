//! Test utilities for scoreforge-scoring
//!
//! Provides common test fixtures used across the crate's test modules.

use std::sync::Arc;

use scoreforge_config::EnvironmentMode;
use scoreforge_core::SimpleScore;
use scoreforge_test::entity::{descriptor, TestEntity, TestSolution, ENTITY_CLASS};

use crate::api::analysis::ConstraintMatchPolicy;
use crate::api::constraint_set::ConstraintSessionFactory;
use crate::constraint::ConstraintProvider;
use crate::director::{IncrementalScoreDirector, ScoreDirector};
use crate::network::FactId;

/// Compiles `provider` against the test solution descriptor.
pub fn session_factory<P>(provider: &P) -> Arc<ConstraintSessionFactory<TestSolution>>
where
    P: ConstraintProvider<TestSolution> + ?Sized,
{
    scoreforge_test::init_test_logging();
    Arc::new(ConstraintSessionFactory::new(descriptor(), provider).unwrap())
}

/// Builds a tracking, fully asserted director over `solution`.
pub fn director<P>(provider: &P, solution: TestSolution) -> IncrementalScoreDirector<TestSolution>
where
    P: ConstraintProvider<TestSolution> + ?Sized,
{
    IncrementalScoreDirector::with_options(
        session_factory(provider),
        solution,
        EnvironmentMode::FullAssert,
        ConstraintMatchPolicy::Enabled,
    )
}

/// Score of the working solution calculated by a fresh session.
pub fn score_from_scratch(director: &IncrementalScoreDirector<TestSolution>) -> SimpleScore {
    let factory = director.session_factory();
    let mut session = factory.build_session(ConstraintMatchPolicy::Disabled);
    let ids: Vec<Vec<FactId>> = factory
        .descriptor()
        .classes()
        .iter()
        .enumerate()
        .map(|(class, c)| {
            (0..c.count(director.working_solution()))
                .map(|index| director.fact_id(class, index).unwrap())
                .collect()
        })
        .collect();
    session.insert_solution(director.working_solution(), &ids);
    session.calculate_score()
}

/// Assigns `value` to the entity at `index`, notifying the director.
pub fn set_value(
    director: &mut IncrementalScoreDirector<TestSolution>,
    index: usize,
    value: Option<&str>,
) {
    let change = director.before_variable_changed(ENTITY_CLASS, index);
    director.working_solution_mut().entities[index].value = value.map(str::to_string);
    director.after_variable_changed(change);
}

/// Moves the entity at `index` to `group`, notifying the director.
pub fn set_group(director: &mut IncrementalScoreDirector<TestSolution>, index: usize, group: &str) {
    let change = director.before_variable_changed(ENTITY_CLASS, index);
    director.working_solution_mut().entities[index].group = group.to_string();
    director.after_variable_changed(change);
}

/// Removes the entity at `index`, notifying the director.
pub fn remove_entity(
    director: &mut IncrementalScoreDirector<TestSolution>,
    index: usize,
) -> TestEntity {
    let change = director.before_entity_removed(ENTITY_CLASS, index);
    let entity = director.working_solution_mut().entities.remove(index);
    director.after_entity_removed(change);
    entity
}

/// Appends `entity`, notifying the director.
pub fn add_entity(director: &mut IncrementalScoreDirector<TestSolution>, entity: TestEntity) {
    let index = director.working_solution().entities.len();
    let change = director.before_entity_added(ENTITY_CLASS, index);
    director.working_solution_mut().entities.push(entity);
    director.after_entity_added(change);
}
