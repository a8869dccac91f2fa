use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scoreforge_config::EnvironmentMode;
use scoreforge_core::{ImpactType, SimpleScore, SolverForgeError};
use scoreforge_test::entity::{descriptor, TestEntity, TestSolution};

use crate::api::analysis::ConstraintMatchPolicy;
use crate::api::constraint_set::ConstraintSessionFactory;
use crate::api::weight_overrides::ConstraintWeightOverrides;
use crate::director::{IncrementalScoreDirector, ScoreDirector};
use crate::network::Element;
use crate::stream::collector::count;
use crate::stream::ConstraintFactory;
use crate::test_utils::{director, remove_entity, set_group, set_value};

use super::Constraint;

type Constraints = Vec<Constraint<SimpleScore>>;

fn solution(groups: &[&str]) -> TestSolution {
    TestSolution::with_entities(
        groups
            .iter()
            .enumerate()
            .map(|(i, group)| TestEntity::assigned(format!("E{i}"), *group, "V"))
            .collect(),
    )
}

fn config_error<P>(provider: &P) -> String
where
    P: super::ConstraintProvider<TestSolution>,
{
    match ConstraintSessionFactory::new(descriptor(), provider) {
        Err(SolverForgeError::Config(message)) => message,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn constraint_accessors() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![
            f.for_each::<TestEntity>()
                .penalize(SimpleScore::of(2))
                .as_constraint("Penalized"),
            f.for_each::<TestEntity>()
                .reward(SimpleScore::ONE)
                .as_constraint_in("other", "Rewarded"),
        ]
    };
    let factory = ConstraintSessionFactory::new(descriptor(), &provider).unwrap();
    let penalized = factory.constraint("scoreforge/test/Penalized").unwrap();
    assert_eq!(penalized.weight(), SimpleScore::of(2));
    assert_eq!(penalized.impact_type(), ImpactType::Penalty);
    assert!(penalized.is_enabled());

    let rewarded = factory.constraint("other/Rewarded").unwrap();
    assert_eq!(rewarded.constraint_ref().package, "other");
    assert_eq!(rewarded.impact_type(), ImpactType::Reward);
    assert!(factory.constraint("scoreforge/test/Rewarded").is_none());
}

#[test]
fn impact_sign_follows_the_impact_type() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![
            f.for_each::<TestEntity>()
                .penalize_with(SimpleScore::of(2), |e| e.integer_property)
                .as_constraint("Penalty"),
            f.for_each::<TestEntity>()
                .reward_with(SimpleScore::of(3), |e| e.integer_property)
                .as_constraint("Reward"),
            f.for_each::<TestEntity>()
                .impact(SimpleScore::of(-5))
                .as_constraint("Negative impact"),
        ]
    };
    let mut entities = solution(&["A", "B"]);
    entities.entities[1].integer_property = 4;
    let mut director = director(&provider, entities);
    // Match weights 1 and 4.
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-10 + 15 - 10));

    let totals = director.constraint_match_totals().unwrap();
    assert_eq!(totals["scoreforge/test/Penalty"].score, SimpleScore::of(-10));
    assert_eq!(totals["scoreforge/test/Penalty"].weight, SimpleScore::of(2));
    assert_eq!(totals["scoreforge/test/Reward"].score, SimpleScore::of(15));
    assert_eq!(totals["scoreforge/test/Negative impact"].score, SimpleScore::of(-10));
    let impact = director
        .session_factory()
        .constraint("scoreforge/test/Negative impact")
        .map(|constraint| constraint.impact_type());
    assert_eq!(impact, Some(ImpactType::Mixed));
}

#[test]
fn duplicate_constraint_id_is_rejected() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![
            f.for_each::<TestEntity>()
                .penalize(SimpleScore::ONE)
                .as_constraint("Twice"),
            f.for_each::<TestEntity>()
                .reward(SimpleScore::ONE)
                .as_constraint("Twice"),
        ]
    };
    let message = config_error(&provider);
    assert!(message.contains("scoreforge/test/Twice"), "{message}");
    assert!(message.contains("more than one constraint"), "{message}");
}

#[test]
fn justify_with_twice_is_rejected() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![f
            .for_each::<TestEntity>()
            .penalize(SimpleScore::ONE)
            .justify_with(|e, _| e.code.clone())
            .justify_with(|e, _| e.group.clone())
            .as_constraint("Justified")]
    };
    let message = config_error(&provider);
    assert!(message.contains("(scoreforge/test/Justified)"), "{message}");
    assert!(message.contains("justify_with() twice"), "{message}");
}

#[test]
fn indict_with_twice_is_rejected() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![f
            .for_each::<TestEntity>()
            .penalize(SimpleScore::ONE)
            .indict_with(|e| vec![e.code.clone()])
            .indict_with(|e| vec![e.group.clone()])
            .as_constraint("Indicted")]
    };
    let message = config_error(&provider);
    assert!(message.contains("indict_with() twice"), "{message}");
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupJustification {
    group: String,
    impact: SimpleScore,
}

#[test]
fn custom_justification_replaces_the_facts() {
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![f
            .for_each::<TestEntity>()
            .group_by_with(|e: &TestEntity| e.group.clone(), count())
            .penalize_with(SimpleScore::ONE, |_: &String, n: &usize| *n as i32)
            .justify_with(|group: &String, _: &usize, impact| GroupJustification {
                group: group.clone(),
                impact,
            })
            .as_constraint("Group size")]
    };
    let mut director = director(&provider, solution(&["A", "A", "B"]));
    director.calculate_score().unwrap();

    let totals = director.constraint_match_totals().unwrap();
    let mut justifications: Vec<_> = totals["scoreforge/test/Group size"]
        .constraint_matches
        .iter()
        .map(|m| {
            assert!(m.facts().is_none());
            m.justification_as::<GroupJustification>().unwrap().clone()
        })
        .collect();
    justifications.sort_by(|a, b| a.group.cmp(&b.group));
    assert_eq!(
        justifications,
        vec![
            GroupJustification {
                group: String::from("A"),
                impact: SimpleScore::of(-2),
            },
            GroupJustification {
                group: String::from("B"),
                impact: SimpleScore::of(-1),
            },
        ]
    );
}

fn in_group_a(f: &ConstraintFactory<TestSolution>) -> Constraints {
    vec![
        f.for_each::<TestEntity>()
            .filter(|e: &TestEntity| e.group == "A")
            .penalize(SimpleScore::ONE)
            .as_constraint("In group A"),
        f.for_each::<TestEntity>()
            .penalize(SimpleScore::of(10))
            .indict_with(|e| vec![e.group.clone()])
            .as_constraint("Group load"),
    ]
}

#[test]
fn default_indictments_follow_incremental_changes() {
    let mut director = director(&in_group_a, solution(&["A", "A", "B"]));
    director.calculate_score().unwrap();

    let indictments = director.indictment_map().unwrap();
    let e0 = indictments
        .find::<TestEntity>(|e| e.code == "E0")
        .unwrap();
    assert_eq!(e0.score, SimpleScore::of(-1));
    assert_eq!(e0.match_count(), 1);
    assert!(indictments.find::<TestEntity>(|e| e.code == "E2").is_none());

    set_group(&mut director, 2, "A");
    remove_entity(&mut director, 0);
    director.calculate_score().unwrap();

    let indictments = director.indictment_map().unwrap();
    assert!(indictments.find::<TestEntity>(|e| e.code == "E0").is_none());
    let e2 = indictments
        .find::<TestEntity>(|e| e.code == "E2")
        .unwrap();
    assert_eq!(e2.score, SimpleScore::of(-1));
}

#[test]
fn indict_with_values_are_compared_by_value() {
    let mut director = director(&in_group_a, solution(&["A", "A", "B"]));
    director.calculate_score().unwrap();

    let indictments = director.indictment_map().unwrap();
    let group_a = indictments.get(&Element::value(String::from("A"))).unwrap();
    assert_eq!(group_a.score, SimpleScore::of(-20));
    assert_eq!(group_a.match_count(), 2);
    assert_eq!(group_a.constraint_refs().len(), 1);

    set_value(&mut director, 2, None);
    director.calculate_score().unwrap();
    let indictments = director.indictment_map().unwrap();
    assert!(indictments.get(&Element::value(String::from("B"))).is_none());
    // Worst first.
    assert_eq!(
        indictments.worst_objects()[0].try_get::<String>().map(String::as_str),
        Some("A")
    );
}

#[test]
fn weight_override_replaces_the_weight() {
    let overrides = ConstraintWeightOverrides::from_pairs([(
        "scoreforge/test/In group A",
        SimpleScore::of(5),
    )]);
    let factory =
        ConstraintSessionFactory::with_weight_overrides(descriptor(), &in_group_a, &overrides)
            .unwrap();
    let mut director = IncrementalScoreDirector::new(Arc::new(factory), solution(&["A", "A", "B"]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-10 - 30));
}

#[test]
fn zero_weight_disables_the_constraint() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn counted(e: &TestEntity) -> bool {
        CALLS.fetch_add(1, Ordering::SeqCst);
        e.group == "A"
    }
    let provider = |f: &ConstraintFactory<TestSolution>| {
        vec![
            f.for_each::<TestEntity>()
                .filter(counted)
                .penalize(SimpleScore::ONE)
                .as_constraint("Counted"),
            f.for_each::<TestEntity>()
                .penalize(SimpleScore::ONE)
                .as_constraint("Every entity"),
        ]
    };
    let overrides =
        ConstraintWeightOverrides::from_pairs([("scoreforge/test/Counted", SimpleScore::ZERO)]);
    let factory =
        ConstraintSessionFactory::with_weight_overrides(descriptor(), &provider, &overrides)
            .unwrap();
    assert!(!factory.constraint("scoreforge/test/Counted").unwrap().is_enabled());
    // Source and assigned filter only.
    assert_eq!(factory.node_count(), 2);

    let mut director = IncrementalScoreDirector::new(Arc::new(factory), solution(&["A", "B"]));
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-2));
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);

    let totals = director.constraint_match_totals().unwrap();
    assert!(!totals.contains_key("scoreforge/test/Counted"));
    assert!(totals.contains_key("scoreforge/test/Every entity"));
}

#[test]
fn unknown_weight_override_is_ignored() {
    scoreforge_test::init_test_logging();
    let overrides =
        ConstraintWeightOverrides::from_pairs([("scoreforge/test/Missing", SimpleScore::of(3))]);
    let factory =
        ConstraintSessionFactory::with_weight_overrides(descriptor(), &in_group_a, &overrides)
            .unwrap();
    assert_eq!(factory.constraints().len(), 2);
    assert!(factory.constraint("scoreforge/test/Missing").is_none());
}

#[test]
fn untracked_session_refuses_analysis() {
    let factory = Arc::new(ConstraintSessionFactory::new(descriptor(), &in_group_a).unwrap());
    let mut director = IncrementalScoreDirector::with_options(
        factory,
        solution(&["A", "B"]),
        EnvironmentMode::Reproducible,
        ConstraintMatchPolicy::Disabled,
    );
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-21));

    match director.constraint_match_totals() {
        Err(SolverForgeError::InvalidState(message)) => {
            assert!(message.contains("not tracked"), "{message}");
        }
        other => panic!("expected an invalid state error, got {other:?}"),
    }
    assert!(matches!(
        director.indictment_map(),
        Err(SolverForgeError::InvalidState(_))
    ));
    assert!(director.explain_score().is_err());
}

#[test]
fn explanation_summarizes_the_constraints() {
    let mut director = director(&in_group_a, solution(&["A", "B"]));
    director.calculate_score().unwrap();

    let explanation = director.explain_score().unwrap();
    assert_eq!(explanation.score, SimpleScore::of(-21));
    assert_eq!(explanation.total_match_count(), 3);
    assert_eq!(explanation.non_zero_constraints().len(), 2);

    let summary = explanation.summary(5);
    assert!(summary.starts_with("Explanation of score (-21):"), "{summary}");
    assert!(summary.contains("constraint (Group load) has 2 matches"), "{summary}");
    assert!(summary.contains("constraint (In group A) has 1 matches"), "{summary}");
}
