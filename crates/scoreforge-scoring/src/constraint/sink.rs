//! Per-constraint score accumulation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use scoreforge_core::Score;

use crate::api::analysis::{ConstraintMatch, ConstraintMatchTotal, DefaultConstraintJustification};
use crate::network::{Element, Facts, IdMap, Signal, TupleId};

use super::Constraint;

/// Matches indicting each object: (sink index, tuple id) pairs.
pub(crate) type IndictmentIndex = HashMap<Element, HashSet<(usize, TupleId)>>;

struct SinkMatch<Sc> {
    score: Sc,
    facts: Facts,
    indicted: Vec<Element>,
}

/// Receives the final tuples of one constraint and keeps its score.
pub(crate) struct ConstraintSink<Sc: Score> {
    constraint: Arc<Constraint<Sc>>,
    tracking: bool,
    matches: IdMap<SinkMatch<Sc>>,
    match_count: usize,
    score: Sc,
}

impl<Sc: Score> ConstraintSink<Sc> {
    pub(crate) fn new(constraint: Arc<Constraint<Sc>>, tracking: bool) -> Self {
        Self {
            constraint,
            tracking,
            matches: IdMap::default(),
            match_count: 0,
            score: Sc::zero(),
        }
    }

    pub(crate) fn constraint(&self) -> &Constraint<Sc> {
        &self.constraint
    }

    pub(crate) fn score(&self) -> Sc {
        self.score
    }

    pub(crate) fn match_count(&self) -> usize {
        self.match_count
    }

    pub(crate) fn apply(&mut self, sink: usize, signal: &Signal, index: &mut IndictmentIndex) {
        match signal {
            Signal::Insert(id, facts) => {
                let entry = self.entry(facts);
                self.score = self.score + entry.score;
                self.match_count += 1;
                link(index, sink, *id, &entry.indicted);
                self.matches.insert(*id, entry);
            }
            Signal::Update(id, facts) => {
                let entry = self.entry(facts);
                if let Some(old) = self.matches.remove(*id) {
                    self.score = self.score - old.score;
                    unlink(index, sink, *id, &old.indicted);
                } else {
                    self.match_count += 1;
                }
                self.score = self.score + entry.score;
                link(index, sink, *id, &entry.indicted);
                self.matches.insert(*id, entry);
            }
            Signal::Retract(id) => {
                if let Some(old) = self.matches.remove(*id) {
                    self.score = self.score - old.score;
                    self.match_count -= 1;
                    unlink(index, sink, *id, &old.indicted);
                }
            }
        }
    }

    fn entry(&self, facts: &Facts) -> SinkMatch<Sc> {
        let indicted = if self.tracking {
            match &self.constraint.indicter {
                Some(indicter) => indicter(facts),
                None => facts.to_vec(),
            }
        } else {
            Vec::new()
        };
        SinkMatch {
            score: self.constraint.impact_of(facts),
            facts: facts.clone(),
            indicted,
        }
    }

    pub(crate) fn constraint_match(&self, id: TupleId) -> Option<ConstraintMatch<Sc>> {
        let entry = self.matches.get(id)?;
        let justification = match &self.constraint.justifier {
            Some(justifier) => justifier(&entry.facts, entry.score),
            None => Arc::new(DefaultConstraintJustification::new(
                entry.facts.to_vec(),
                entry.score,
            )),
        };
        Some(ConstraintMatch {
            constraint_ref: self.constraint.constraint_ref.clone(),
            score: entry.score,
            justification,
            indicted_objects: entry.indicted.clone(),
        })
    }

    pub(crate) fn total(&self) -> ConstraintMatchTotal<Sc> {
        ConstraintMatchTotal {
            constraint_ref: self.constraint.constraint_ref.clone(),
            weight: self.constraint.weight,
            score: self.score,
            constraint_matches: self
                .matches
                .iter()
                .filter_map(|(id, _)| self.constraint_match(id))
                .collect(),
        }
    }

    /// The facts and score of every current match.
    pub(crate) fn match_scores(&self) -> impl Iterator<Item = (&Facts, Sc)> {
        self.matches.iter().map(|(_, entry)| (&entry.facts, entry.score))
    }
}

fn link(index: &mut IndictmentIndex, sink: usize, id: TupleId, objects: &[Element]) {
    for object in objects {
        index.entry(object.clone()).or_default().insert((sink, id));
    }
}

fn unlink(index: &mut IndictmentIndex, sink: usize, id: TupleId, objects: &[Element]) {
    for object in objects {
        if let Some(refs) = index.get_mut(object) {
            refs.remove(&(sink, id));
            if refs.is_empty() {
                index.remove(object);
            }
        }
    }
}
