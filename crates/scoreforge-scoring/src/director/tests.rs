//! Tests for the score directors.

use scoreforge_config::EnvironmentMode;
use scoreforge_core::{SimpleScore, SolverForgeError};
use scoreforge_test::entity::{descriptor, TestEntity, TestSolution, ENTITY_CLASS, GROUP_CLASS};
use scoreforge_test::list::{
    list_descriptor, TestListEntity, TestListSolution, TestListValue, LIST_ENTITY_CLASS,
    LIST_VALUE_CLASS,
};

use crate::api::analysis::ConstraintMatchPolicy;
use crate::constraint::Constraint;
use crate::stream::collector::count;
use crate::stream::joiner::equal;
use crate::stream::ConstraintFactory;
use crate::test_utils::{add_entity, director, remove_entity, set_group, set_value};

use super::{IncrementalScoreDirector, ScoreDirector, ScoreDirectorFactory};

// ============================================================================
// Fixtures
// ============================================================================

fn constraints(f: &ConstraintFactory<TestSolution>) -> Vec<Constraint<SimpleScore>> {
    vec![
        f.for_each::<TestEntity>()
            .filter(|e: &TestEntity| e.group == "A")
            .penalize(SimpleScore::ONE)
            .as_constraint("In group A"),
        f.for_each_unique_pair(equal(|e: &TestEntity| e.value.clone()))
            .penalize(SimpleScore::of(10))
            .as_constraint("Same value"),
    ]
}

fn solution(entities: &[(&str, Option<&str>)]) -> TestSolution {
    TestSolution::with_entities(
        entities
            .iter()
            .enumerate()
            .map(|(i, (group, value))| match value {
                Some(value) => TestEntity::assigned(format!("E{i}"), *group, *value),
                None => TestEntity::unassigned(format!("E{i}"), *group),
            })
            .collect(),
    )
}

fn director_factory(mode: EnvironmentMode) -> ScoreDirectorFactory<TestSolution> {
    scoreforge_test::init_test_logging();
    ScoreDirectorFactory::new(descriptor(), &constraints)
        .unwrap()
        .with_environment_mode(mode)
}

fn corruption_message(result: scoreforge_core::Result<SimpleScore>) -> String {
    match result {
        Err(SolverForgeError::ScoreCorruption(message)) => message,
        other => panic!("expected a score corruption, got {other:?}"),
    }
}

// ============================================================================
// IncrementalScoreDirector
// ============================================================================

#[test]
fn test_calculate_score_sets_solution_score() {
    let mut director = director(&constraints, solution(&[("A", Some("X")), ("B", Some("X"))]));
    assert_eq!(director.working_solution().score, None);

    let score = director.calculate_score().unwrap();
    assert_eq!(score, SimpleScore::of(-11));
    assert_eq!(director.working_solution().score, Some(score));
    assert_eq!(director.calculation_count(), 1);
    assert!(director.is_incremental());
}

#[test]
fn test_variable_change() {
    let mut director = director(&constraints, solution(&[("A", Some("X")), ("B", Some("Y"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    set_value(&mut director, 1, Some("X"));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-11));

    set_group(&mut director, 0, "B");
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-10));
    assert_eq!(director.calculation_count(), 3);
}

#[test]
fn test_entity_added_and_removed() {
    let mut director = director(&constraints, solution(&[("A", Some("X"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    add_entity(&mut director, TestEntity::assigned("E1", "A", "X"));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-12));

    let removed = remove_entity(&mut director, 0);
    assert_eq!(removed.code, "E0");
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
}

#[test]
fn test_entity_inserted_in_the_middle() {
    let mut director = director(&constraints, solution(&[("A", Some("X")), ("B", Some("Y"))]));
    director.calculate_score().unwrap();
    let second = director.fact_id(ENTITY_CLASS, 1);

    let change = director.before_entity_added(ENTITY_CLASS, 1);
    assert_eq!((change.class(), change.index()), (ENTITY_CLASS, 1));
    director
        .working_solution_mut()
        .entities
        .insert(1, TestEntity::assigned("E2", "B", "Y"));
    director.after_entity_added(change);

    assert_eq!(director.fact_id(ENTITY_CLASS, 2), second);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-11));

    // The entity now at index 2 is the one that was at index 1.
    set_value(&mut director, 2, Some("Z"));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
}

#[test]
fn test_fact_ids_shift_on_removal() {
    let mut director = director(
        &constraints,
        solution(&[("A", Some("X")), ("B", Some("Y")), ("B", Some("Z"))]),
    );
    let ids: Vec<_> = (0..3)
        .map(|index| director.fact_id(ENTITY_CLASS, index).unwrap())
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[0] < ids[1] && ids[1] < ids[2]);

    let change = director.before_entity_removed(ENTITY_CLASS, 1);
    director.working_solution_mut().entities.remove(1);
    director.after_entity_removed(change);

    assert_eq!(director.fact_id(ENTITY_CLASS, 0), Some(ids[0]));
    assert_eq!(director.fact_id(ENTITY_CLASS, 1), Some(ids[2]));
    assert_eq!(director.fact_id(ENTITY_CLASS, 2), None);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
}

#[test]
fn test_unused_class_changes_are_ignored() {
    let mut solution = TestSolution::generate(2, 2, 2);
    solution.entities[0].group = String::from("A");
    let mut director = director(&constraints, solution);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    // No constraint reads groups.
    let change = director.before_problem_property_changed(GROUP_CLASS, 0);
    director.working_solution_mut().groups[0].code = String::from("Renamed");
    director.after_problem_property_changed(change);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
    assert_eq!(director.instance_count(GROUP_CLASS), 2);
}

#[test]
fn test_set_working_solution_reloads() {
    let mut director = director(&constraints, solution(&[("A", Some("X"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    director.set_working_solution(solution(&[("B", Some("X")), ("B", Some("X"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-10));

    let cloned = director.clone_working_solution();
    assert_eq!(cloned.entities.len(), 2);
    let solution = director.into_working_solution();
    assert_eq!(solution.score, Some(SimpleScore::of(-10)));
}

#[test]
fn test_match_counts_survive_changes() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![f
            .for_each::<TestEntity>()
            .group_by_with(|e: &TestEntity| e.group.clone(), count())
            .penalize_with(SimpleScore::ONE, |_: &String, n: &usize| *n as i32)
            .as_constraint("Group size")]
    };
    let mut director = director(
        &provider,
        solution(&[("A", Some("X")), ("A", Some("X")), ("B", Some("X"))]),
    );
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-3));

    set_value(&mut director, 2, None);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-2));
    let totals = director.constraint_match_totals().unwrap();
    assert_eq!(totals["scoreforge/test/Group size"].match_count(), 1);
}

// ============================================================================
// Corruption detection
// ============================================================================

#[test]
fn test_unnotified_change_is_reported_as_corruption() {
    let mut director = director(&constraints, solution(&[("A", Some("X")), ("B", Some("Y"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    director.working_solution_mut().entities[0].group = String::from("B");
    let message = corruption_message(director.calculate_score());

    assert!(message.contains("the working score (-1)"), "{message}");
    assert!(message.contains("uncorrupted score (0)"), "{message}");
    assert!(message.contains("Score corruption analysis:"), "{message}");
    assert!(
        message.contains("The corrupted session has 1 matches which should not be there:"),
        "{message}"
    );
    assert!(message.contains("scoreforge/test/In group A"), "{message}");
    assert!(
        message.contains("The corrupted session has no matches which are missing."),
        "{message}"
    );
}

#[test]
fn test_missing_matches_are_reported() {
    let mut director = director(&constraints, solution(&[("A", Some("X")), ("B", Some("Y"))]));
    director.calculate_score().unwrap();

    director.working_solution_mut().entities[1].value = Some(String::from("X"));
    let message = corruption_message(director.calculate_score());
    assert!(
        message.contains("The corrupted session has 1 matches which are missing:"),
        "{message}"
    );
    assert!(message.contains("scoreforge/test/Same value"), "{message}");
}

#[test]
fn test_corruption_analysis_lists_at_most_ten_matches() {
    let entities: Vec<_> = (0..13).map(|_| ("A", Some("X"))).collect();
    let mut director = director(&constraints, solution(&entities));
    director.calculate_score().unwrap();

    for entity in &mut director.working_solution_mut().entities {
        entity.group = String::from("B");
    }
    let message = corruption_message(director.calculate_score());
    assert!(message.contains("has 13 matches which should not be there"), "{message}");
    assert!(message.contains("... 3 more"), "{message}");
}

#[test]
fn test_untracked_corruption_has_no_analysis() {
    let factory = director_factory(EnvironmentMode::FullAssert)
        .with_constraint_match_policy(ConstraintMatchPolicy::Disabled);
    let mut director = factory.build_score_director(solution(&[("A", Some("X"))]));
    director.calculate_score().unwrap();

    director.working_solution_mut().entities[0].group = String::from("B");
    let message = corruption_message(director.calculate_score());
    assert!(message.contains("could not be generated"), "{message}");
    assert!(message.contains("Disabled"), "{message}");
}

#[test]
fn test_corruption_is_only_checked_when_asked_outside_full_assert() {
    let factory = director_factory(EnvironmentMode::FastAssert);
    let mut director = factory.build_score_director(solution(&[("A", Some("X"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    director.working_solution_mut().entities[0].group = String::from("B");
    // The stale score is returned as is.
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));

    let error = director
        .assert_working_score_from_scratch("unnotified change")
        .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("after completed action (unnotified change)"), "{message}");
}

#[test]
fn test_assert_expected_working_score() {
    let mut director = director(&constraints, solution(&[("A", Some("X"))]));
    director.calculate_score().unwrap();

    assert!(director
        .assert_expected_working_score(SimpleScore::of(-1), "noop")
        .is_ok());
    let message = corruption_message(
        director
            .assert_expected_working_score(SimpleScore::of(-5), "undo move")
            .map(|()| SimpleScore::ZERO),
    );
    assert!(message.contains("expected working score (-5)"), "{message}");
    assert!(message.contains("working score (-1)"), "{message}");
    assert!(message.contains("(undo move)"), "{message}");
}

// ============================================================================
// Problem facts and list variables
// ============================================================================

fn list_constraints(f: &ConstraintFactory<TestListSolution>) -> Vec<Constraint<SimpleScore>> {
    vec![
        f.for_each_including_unassigned::<TestListValue>()
            .if_not_exists(equal_values())
            .penalize(SimpleScore::of(100))
            .as_constraint("Unassigned value"),
        f.for_each::<TestListValue>()
            .penalize(SimpleScore::ONE)
            .as_constraint("Assigned value"),
        f.for_each::<TestListEntity>()
            .penalize_with(SimpleScore::of(10), |e| e.values.len() as i32)
            .as_constraint("List length"),
    ]
}

fn equal_values() -> crate::stream::Joiner<(TestListValue,), TestListEntity> {
    crate::stream::joiner::filtering(|v: &TestListValue, e: &TestListEntity| {
        e.values.contains(&v.code)
    })
}

fn list_director(solution: TestListSolution) -> IncrementalScoreDirector<TestListSolution> {
    scoreforge_test::init_test_logging();
    let factory = ScoreDirectorFactory::new(list_descriptor(), &list_constraints)
        .unwrap()
        .with_environment_mode(EnvironmentMode::FullAssert);
    factory.build_score_director(solution)
}

fn assign(
    director: &mut IncrementalScoreDirector<TestListSolution>,
    entity: usize,
    value: usize,
) {
    let code = director.working_solution().values[value].code.clone();
    let position = director.working_solution().entities[entity].values.len();

    let element = director.before_list_variable_element_assigned(LIST_VALUE_CLASS, value);
    let list = director.before_list_variable_changed(LIST_ENTITY_CLASS, entity, position, position);
    director.working_solution_mut().entities[entity].values.push(code);
    director.after_list_variable_changed(list);
    director.after_list_variable_element_assigned(element);
}

#[test]
fn test_list_value_assignment() {
    let mut director = list_director(TestListSolution::generate(2, 3));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-300));

    assign(&mut director, 0, 0);
    assign(&mut director, 0, 2);
    assign(&mut director, 1, 1);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-3 - 30));

    let element = director.before_list_variable_element_unassigned(LIST_VALUE_CLASS, 2);
    let list = director.before_list_variable_changed(LIST_ENTITY_CLASS, 0, 1, 2);
    assert_eq!(list.range(), 1..2);
    director.working_solution_mut().entities[0].values.truncate(1);
    director.after_list_variable_changed(list);
    director.after_list_variable_element_unassigned(element);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-100 - 2 - 20));
}

#[test]
fn test_problem_fact_added_and_removed() {
    let mut director = list_director(TestListSolution::generate(1, 1));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-100));

    let change = director.before_problem_fact_added(LIST_VALUE_CLASS, 1);
    director.working_solution_mut().values.push(TestListValue {
        code: String::from("Extra"),
    });
    director.after_problem_fact_added(change);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-200));

    let change = director.before_problem_fact_removed(LIST_VALUE_CLASS, 0);
    director.working_solution_mut().values.remove(0);
    director.after_problem_fact_removed(change);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-100));
}

// ============================================================================
// SimpleScoreDirector and factory
// ============================================================================

#[test]
fn test_simple_director_agrees_with_incremental() {
    let factory = director_factory(EnvironmentMode::Reproducible);
    let initial = solution(&[("A", Some("X")), ("B", Some("X")), ("A", None)]);
    let mut incremental = factory.build_score_director(initial.clone());
    let mut simple = factory.build_simple_score_director(initial);
    assert!(!simple.is_incremental());

    let changes: [(usize, Option<&str>); 4] =
        [(2, Some("X")), (0, Some("Y")), (1, None), (0, Some("X"))];
    for (index, value) in changes {
        for director in [
            &mut incremental as &mut dyn ScoreDirector<TestSolution>,
            &mut simple,
        ] {
            let change = director.before_variable_changed(ENTITY_CLASS, index);
            director.working_solution_mut().entities[index].value = value.map(str::to_string);
            director.after_variable_changed(change);
        }
        assert_eq!(
            incremental.calculate_score().unwrap(),
            simple.calculate_score().unwrap()
        );
    }
}

#[test]
fn test_simple_director_caches_clean_scores() {
    let factory = director_factory(EnvironmentMode::Reproducible);
    let mut director = factory.build_simple_score_director(solution(&[("A", Some("X"))]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
    assert_eq!(director.calculation_count(), 2);

    director.working_solution_mut().entities[0].group = String::from("B");
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::ZERO);
}

#[test]
fn test_factory_shares_the_compiled_constraints() {
    let factory = director_factory(EnvironmentMode::FullAssert);
    assert_eq!(factory.environment_mode(), EnvironmentMode::FullAssert);
    assert_eq!(factory.session_factory().constraints().len(), 2);
    assert_eq!(factory.solution_descriptor().classes().len(), 3);

    let copy = factory.clone();
    let mut first = factory.build_score_director(solution(&[("A", Some("X"))]));
    let mut second = copy.build_score_director(solution(&[("B", Some("X"))]));
    assert_eq!(first.environment_mode(), EnvironmentMode::FullAssert);
    assert_eq!(first.calculate_score().unwrap(), SimpleScore::of(-1));
    assert_eq!(second.calculate_score().unwrap(), SimpleScore::ZERO);
}

#[test]
fn test_factory_reports_invalid_constraints() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![f
            .for_each::<TestListValue>()
            .penalize(SimpleScore::ONE)
            .as_constraint("Wrong solution")]
    };
    let result = ScoreDirectorFactory::new(descriptor(), &provider);
    assert!(matches!(result, Err(SolverForgeError::Config(_))));
}
