use std::sync::Arc;

use scoreforge_core::{ConstraintRef, HardSoftScore, SimpleScore};

use super::analysis::*;
use super::weight_overrides::{ConstraintWeightOverrides, WeightProvider};
use crate::network::Element;

#[test]
fn overrides_put_get_and_default() {
    let mut overrides = ConstraintWeightOverrides::<SimpleScore>::new();
    assert!(overrides.is_empty());
    overrides.put("pkg/Test", SimpleScore::of(5));

    assert!(overrides.contains("pkg/Test"));
    assert_eq!(overrides.get("pkg/Test"), Some(&SimpleScore::of(5)));
    assert_eq!(
        overrides.get_or_default("pkg/Test", SimpleScore::of(1)),
        SimpleScore::of(5)
    );
    assert_eq!(
        overrides.get_or_default("pkg/Other", SimpleScore::of(1)),
        SimpleScore::of(1)
    );
    assert_eq!(overrides.remove("pkg/Test"), Some(SimpleScore::of(5)));
    assert!(!overrides.contains("pkg/Test"));
}

#[test]
fn overrides_from_pairs() {
    let overrides = ConstraintWeightOverrides::<HardSoftScore>::from_pairs([
        ("hard", HardSoftScore::of_hard(1)),
        ("soft", HardSoftScore::of_soft(10)),
    ]);
    assert_eq!(overrides.len(), 2);
    assert_eq!(overrides.get("soft"), Some(&HardSoftScore::of_soft(10)));
}

#[test]
fn overrides_report_unknown_ids() {
    let overrides = ConstraintWeightOverrides::<SimpleScore>::from_pairs([
        ("pkg/Known", SimpleScore::of(2)),
        ("pkg/Typo", SimpleScore::of(3)),
    ]);
    let known = ConstraintRef::new("pkg", "Known");
    assert_eq!(overrides.unknown_ids(&[&known]), vec!["pkg/Typo"]);
}

#[test]
fn weight_provider_through_arc() {
    let mut overrides = ConstraintWeightOverrides::<SimpleScore>::new();
    overrides.put("test", SimpleScore::of(5));
    let shared = Arc::new(overrides);

    let provider: &dyn WeightProvider<SimpleScore> = &shared;
    assert_eq!(provider.weight("test"), Some(SimpleScore::of(5)));
    assert_eq!(provider.weight("other"), None);
    assert_eq!(
        provider.weight_or_default("other", SimpleScore::of(1)),
        SimpleScore::of(1)
    );
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Room(u8);

fn constraint_match(name: &str, score: i32, rooms: &[u8]) -> ConstraintMatch<SimpleScore> {
    let facts: Vec<Element> = rooms.iter().map(|&r| Element::value(Room(r))).collect();
    ConstraintMatch {
        constraint_ref: ConstraintRef::new("pkg", name),
        score: SimpleScore::of(score),
        justification: Arc::new(DefaultConstraintJustification::new(
            facts.clone(),
            SimpleScore::of(score),
        )),
        indicted_objects: facts,
    }
}

#[test]
fn default_justification_exposes_facts() {
    let m = constraint_match("Clash", -1, &[1, 2]);
    let facts = m.facts().unwrap();
    assert_eq!(facts.len(), 2);
    assert_eq!(facts[1].get::<Room>(), &Room(2));
    assert!(m.justification_as::<String>().is_none());
}

#[test]
fn indictments_sum_matches_per_object() {
    let mut map = IndictmentMap::<SimpleScore>::new();
    map.add_match(&constraint_match("Clash", -1, &[1, 2]));
    map.add_match(&constraint_match("Capacity", -3, &[2]));

    assert_eq!(map.len(), 2);
    let room_two = map.find::<Room>(|room| room.0 == 2).unwrap();
    assert_eq!(room_two.score, SimpleScore::of(-4));
    assert_eq!(room_two.match_count(), 2);
    assert_eq!(room_two.constraint_refs().len(), 2);

    let room_one = map.get(&Element::value(Room(1))).unwrap();
    assert_eq!(room_one.score, SimpleScore::of(-1));
    assert_eq!(map.worst_objects()[0], &Element::value(Room(2)));
}

#[test]
fn explanation_lists_non_zero_constraints() {
    let mut totals = std::collections::BTreeMap::new();
    let clash = constraint_match("Clash", -2, &[1]);
    totals.insert(
        "pkg/Clash".to_string(),
        ConstraintMatchTotal {
            constraint_ref: clash.constraint_ref.clone(),
            weight: SimpleScore::of(2),
            score: SimpleScore::of(-2),
            constraint_matches: vec![clash],
        },
    );
    totals.insert(
        "pkg/Quiet".to_string(),
        ConstraintMatchTotal {
            constraint_ref: ConstraintRef::new("pkg", "Quiet"),
            weight: SimpleScore::of(1),
            score: SimpleScore::ZERO,
            constraint_matches: Vec::new(),
        },
    );
    let explanation = ScoreExplanation {
        score: SimpleScore::of(-2),
        constraint_match_totals: totals,
        indictments: IndictmentMap::new(),
    };
    assert_eq!(explanation.total_match_count(), 1);
    assert_eq!(explanation.non_zero_constraints().len(), 1);
    let summary = explanation.summary(5);
    assert!(summary.starts_with("Explanation of score (-2):"));
    assert!(summary.contains("constraint (Clash) has 1 matches"));
}
