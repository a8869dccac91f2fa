//! Score analysis types for detailed constraint tracking.
//!
//! This module provides types for analyzing constraint matches in detail:
//! which facts are involved in each match, the per-constraint totals of a
//! score, and the per-object indictments.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, DomainObject, Score};

use crate::network::Element;

/// Whether a session keeps enough information to explain its score.
///
/// Disabled sessions only keep per-constraint totals, which is what a
/// solver needs; justifications and indictments are then unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConstraintMatchPolicy {
    #[default]
    Enabled,
    Disabled,
}

impl ConstraintMatchPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ConstraintMatchPolicy::Enabled)
    }
}

/// Explains why a constraint matched.
///
/// Any domain object can serve as a justification; it is recovered with
/// [`ConstraintMatch::justification_as`].
pub trait ConstraintJustification: DomainObject {}

impl<T: DomainObject> ConstraintJustification for T {}

/// Justification used when a constraint has no `justify_with` mapping:
/// the matched facts and the impact of the match.
#[derive(Debug, Clone)]
pub struct DefaultConstraintJustification<Sc: Score> {
    pub facts: Vec<Element>,
    pub impact: Sc,
}

impl<Sc: Score> DefaultConstraintJustification<Sc> {
    pub fn new(facts: Vec<Element>, impact: Sc) -> Self {
        Self { facts, impact }
    }
}

/// One tuple matched by one constraint.
#[derive(Debug, Clone)]
pub struct ConstraintMatch<Sc: Score> {
    /// Reference to the constraint that matched.
    pub constraint_ref: ConstraintRef,
    /// Score impact of this match.
    pub score: Sc,
    pub justification: Arc<dyn ConstraintJustification>,
    /// Objects this match indicts.
    pub indicted_objects: Vec<Element>,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    /// Downcasts the justification.
    pub fn justification_as<J: 'static>(&self) -> Option<&J> {
        (*self.justification).as_any().downcast_ref::<J>()
    }

    /// The matched facts when the default justification is used.
    pub fn facts(&self) -> Option<&[Element]> {
        self.justification_as::<DefaultConstraintJustification<Sc>>()
            .map(|justification| justification.facts.as_slice())
    }
}

/// Per-constraint breakdown of a score.
#[derive(Debug, Clone)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Constraint weight (score per match before the match weight).
    pub weight: Sc,
    /// Total score from this constraint.
    pub score: Sc,
    pub constraint_matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn match_count(&self) -> usize {
        self.constraint_matches.len()
    }

    pub fn constraint_id(&self) -> String {
        self.constraint_ref.full_name()
    }
}

/// How one object impacts the score.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub indicted_object: Element,
    /// Sum of the scores of every match indicting the object.
    pub score: Sc,
    pub constraint_matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    pub fn new(indicted_object: Element) -> Self {
        Self {
            indicted_object,
            score: Sc::zero(),
            constraint_matches: Vec::new(),
        }
    }

    pub fn add_match(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.constraint_matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.constraint_matches.len()
    }

    /// Distinct constraints with a match indicting the object.
    pub fn constraint_refs(&self) -> Vec<&ConstraintRef> {
        let mut refs: Vec<_> = self
            .constraint_matches
            .iter()
            .map(|m| &m.constraint_ref)
            .collect();
        refs.sort();
        refs.dedup();
        refs
    }
}

/// Indictments keyed by indicted object.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    indictments: HashMap<Element, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    pub fn new() -> Self {
        Self {
            indictments: HashMap::new(),
        }
    }

    /// Adds a match to the indictment of every object it indicts.
    pub fn add_match(&mut self, constraint_match: &ConstraintMatch<Sc>) {
        for object in &constraint_match.indicted_objects {
            self.indictments
                .entry(object.clone())
                .or_insert_with(|| Indictment::new(object.clone()))
                .add_match(constraint_match.clone());
        }
    }

    pub(crate) fn insert(&mut self, indictment: Indictment<Sc>) {
        self.indictments
            .insert(indictment.indicted_object.clone(), indictment);
    }

    pub fn get(&self, object: &Element) -> Option<&Indictment<Sc>> {
        self.indictments.get(object)
    }

    /// Finds the indictment of the first object of type `T` accepted by
    /// `predicate`.
    pub fn find<T: 'static>(&self, predicate: impl Fn(&T) -> bool) -> Option<&Indictment<Sc>> {
        self.indictments
            .iter()
            .find(|(object, _)| object.try_get::<T>().is_some_and(&predicate))
            .map(|(_, indictment)| indictment)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Element, &Indictment<Sc>)> {
        self.indictments.iter()
    }

    /// Indicted objects sorted by score impact, worst first.
    pub fn worst_objects(&self) -> Vec<&Element> {
        let mut objects: Vec<_> = self.indictments.values().collect();
        objects.sort_by(|a, b| a.score.cmp(&b.score));
        objects.into_iter().map(|i| &i.indicted_object).collect()
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete score explanation: totals per constraint and indictments.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    /// Keyed by fully qualified constraint id.
    pub constraint_match_totals: BTreeMap<String, ConstraintMatchTotal<Sc>>,
    pub indictments: IndictmentMap<Sc>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn total_match_count(&self) -> usize {
        self.constraint_match_totals
            .values()
            .map(ConstraintMatchTotal::match_count)
            .sum()
    }

    /// Returns constraints with non-zero scores.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintMatchTotal<Sc>> {
        self.constraint_match_totals
            .values()
            .filter(|total| total.score != Sc::zero())
            .collect()
    }

    /// Human readable breakdown, worst constraints first, listing up to
    /// `matches_per_constraint` matches of each.
    pub fn summary(&self, matches_per_constraint: usize) -> String {
        let mut totals: Vec<_> = self.constraint_match_totals.values().collect();
        totals.sort_by(|a, b| a.score.cmp(&b.score));

        let mut out = String::new();
        let _ = writeln!(out, "Explanation of score ({}):", self.score);
        let _ = writeln!(out, "    Constraint matches:");
        for total in totals {
            let _ = writeln!(
                out,
                "        {}: constraint ({}) has {} matches:",
                total.score,
                total.constraint_ref.name,
                total.match_count()
            );
            for m in total.constraint_matches.iter().take(matches_per_constraint) {
                let _ = writeln!(out, "            {}: {:?}", m.score, m.justification);
            }
            if total.match_count() > matches_per_constraint {
                let _ = writeln!(out, "            ...");
            }
        }
        out
    }
}

impl<Sc: Score> fmt::Display for ScoreExplanation<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary(3))
    }
}
