//! A running constraint network and its score sinks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use scoreforge_core::{
    ClassDescriptor, PlanningSolution, Result, Score, SolutionDescriptor, SolverForgeError,
};
use tracing::trace;

use crate::api::analysis::{
    ConstraintMatchPolicy, ConstraintMatchTotal, Indictment, IndictmentMap, ScoreExplanation,
};
use crate::constraint::{ConstraintSink, IndictmentIndex};
use crate::network::{Element, FactHandle, FactId, Facts, Network};

/// One current match, as compared by score corruption analysis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatchRecord<Sc> {
    pub(crate) constraint_id: String,
    pub(crate) facts: Facts,
    pub(crate) score: Sc,
}

/// Incrementally maintained score of one set of facts.
///
/// Facts are fed per class index of the solution descriptor. Changes are
/// buffered in the network and propagated when a score or an analysis is
/// requested, so a batch of changes costs one propagation pass.
pub struct ConstraintSession<S: PlanningSolution> {
    descriptor: Arc<SolutionDescriptor<S>>,
    network: Network,
    sinks: Vec<ConstraintSink<S::Score>>,
    indictments: IndictmentIndex,
    policy: ConstraintMatchPolicy,
}

impl<S: PlanningSolution> ConstraintSession<S> {
    pub(crate) fn new(
        descriptor: Arc<SolutionDescriptor<S>>,
        network: Network,
        sinks: Vec<ConstraintSink<S::Score>>,
        policy: ConstraintMatchPolicy,
    ) -> Self {
        Self {
            descriptor,
            network,
            sinks,
            indictments: IndictmentIndex::new(),
            policy,
        }
    }

    pub fn descriptor(&self) -> &SolutionDescriptor<S> {
        &self.descriptor
    }

    pub fn match_policy(&self) -> ConstraintMatchPolicy {
        self.policy
    }

    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    /// Number of enabled constraints scored by this session.
    pub fn constraint_count(&self) -> usize {
        self.sinks.len()
    }

    /// Whether any stream selects from the class at `class`.
    pub fn is_class_used(&self, class: usize) -> bool {
        self.network.has_source(class)
    }

    pub fn insert(&mut self, class: usize, handle: FactHandle) {
        self.network.insert_fact(class, handle);
    }

    /// Replaces the snapshot of a fact previously inserted with the same id.
    pub fn update(&mut self, class: usize, handle: FactHandle) {
        self.network.update_fact(class, handle);
    }

    pub fn retract(&mut self, class: usize, fact_id: FactId) {
        self.network.retract_fact(class, fact_id);
    }

    /// Inserts every instance of every class a stream selects from.
    ///
    /// `ids[class][i]` is the fact id of the `i`-th instance of `class`.
    pub(crate) fn insert_solution(&mut self, solution: &S, ids: &[Vec<FactId>]) {
        let descriptor = Arc::clone(&self.descriptor);
        for (class, class_descriptor) in descriptor.classes().iter().enumerate() {
            if !self.is_class_used(class) {
                continue;
            }
            for (index, &id) in ids[class].iter().enumerate() {
                if let Some(handle) = fact_handle(class_descriptor, solution, index, id) {
                    self.insert(class, handle);
                }
            }
        }
    }

    fn settle(&mut self) {
        let sinks = &mut self.sinks;
        let indictments = &mut self.indictments;
        self.network
            .settle(|sink, signal| sinks[sink].apply(sink, signal, indictments));
    }

    /// Propagates pending changes and returns the total score.
    pub fn calculate_score(&mut self) -> S::Score {
        self.settle();
        let score = self
            .sinks
            .iter()
            .fold(S::Score::zero(), |total, sink| total + sink.score());
        trace!(event = "score_calculated", score = %score);
        score
    }

    fn require_tracking(&self, what: &str) -> Result<()> {
        if self.policy.is_enabled() {
            Ok(())
        } else {
            Err(SolverForgeError::InvalidState(format!(
                "The {what} is not available: constraint matches are not tracked \
                 (constraint match policy is {:?}).",
                self.policy
            )))
        }
    }

    /// Per-constraint totals keyed by fully qualified constraint id.
    pub fn constraint_match_totals(
        &mut self,
    ) -> Result<BTreeMap<String, ConstraintMatchTotal<S::Score>>> {
        self.require_tracking("constraint match total map")?;
        self.settle();
        Ok(self
            .sinks
            .iter()
            .map(|sink| (sink.constraint().id(), sink.total()))
            .collect())
    }

    /// Match counts keyed by fully qualified constraint id.
    ///
    /// Available whatever the match policy.
    pub fn match_counts(&mut self) -> BTreeMap<String, usize> {
        self.settle();
        self.sinks
            .iter()
            .map(|sink| (sink.constraint().id(), sink.match_count()))
            .collect()
    }

    /// The indictment of one object, if any match indicts it.
    pub fn indictment(&mut self, object: &Element) -> Result<Option<Indictment<S::Score>>> {
        self.require_tracking("indictment map")?;
        self.settle();
        Ok(self.build_indictment(object))
    }

    fn build_indictment(&self, object: &Element) -> Option<Indictment<S::Score>> {
        let refs = self.indictments.get(object)?;
        let mut indictment = Indictment::new(object.clone());
        let mut refs: Vec<_> = refs.iter().copied().collect();
        refs.sort_unstable();
        for (sink, id) in refs {
            if let Some(constraint_match) = self.sinks[sink].constraint_match(id) {
                indictment.add_match(constraint_match);
            }
        }
        Some(indictment)
    }

    /// Indictments of every object indicted by at least one match.
    pub fn indictment_map(&mut self) -> Result<IndictmentMap<S::Score>> {
        self.require_tracking("indictment map")?;
        self.settle();
        let mut map = IndictmentMap::new();
        for object in self.indictments.keys() {
            if let Some(indictment) = self.build_indictment(object) {
                map.insert(indictment);
            }
        }
        Ok(map)
    }

    pub fn explain(&mut self) -> Result<ScoreExplanation<S::Score>> {
        let constraint_match_totals = self.constraint_match_totals()?;
        let indictments = self.indictment_map()?;
        Ok(ScoreExplanation {
            score: self.calculate_score(),
            constraint_match_totals,
            indictments,
        })
    }

    /// Every current match, or `None` when matches are not tracked.
    pub(crate) fn match_records(&mut self) -> Option<Vec<MatchRecord<S::Score>>> {
        if !self.policy.is_enabled() {
            return None;
        }
        self.settle();
        let mut records = Vec::new();
        for sink in &self.sinks {
            let constraint_id = sink.constraint().id();
            records.extend(sink.match_scores().map(|(facts, score)| MatchRecord {
                constraint_id: constraint_id.clone(),
                facts: facts.clone(),
                score,
            }));
        }
        Some(records)
    }
}

/// Snapshots the `index`-th instance of a class.
pub(crate) fn fact_handle<S>(
    class: &ClassDescriptor<S>,
    solution: &S,
    index: usize,
    id: FactId,
) -> Option<FactHandle> {
    let object = class.snapshot(solution, index)?;
    Some(FactHandle::new(id, object, class.is_assigned(solution, index)))
}

impl<S: PlanningSolution> fmt::Debug for ConstraintSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSession")
            .field("solution", &self.descriptor.type_name)
            .field("constraints", &self.sinks.len())
            .field("nodes", &self.network.node_count())
            .field("policy", &self.policy)
            .finish()
    }
}
