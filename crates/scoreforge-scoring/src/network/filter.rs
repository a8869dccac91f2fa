use super::element::Facts;
use super::node::{Node, Predicate, Side};
use super::tuple::{IdMap, OutputTuples, Signal, TupleId};

/// Forwards the tuples that satisfy a predicate.
///
/// An update that flips the predicate becomes an insert or a retract.
pub struct FilterNode {
    predicate: Predicate,
    outputs: IdMap<TupleId>,
    out: OutputTuples,
}

impl FilterNode {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            outputs: IdMap::default(),
            out: OutputTuples::new(),
        }
    }
}

impl Node for FilterNode {
    fn insert(&mut self, _side: Side, id: TupleId, facts: &Facts) {
        if (self.predicate)(facts) {
            let out_id = self.out.create(facts.clone());
            self.outputs.insert(id, out_id);
        }
    }

    fn update(&mut self, _side: Side, id: TupleId, facts: &Facts) {
        let passes = (self.predicate)(facts);
        match (self.outputs.get(id).copied(), passes) {
            (Some(out_id), true) => self.out.update(out_id, facts.clone()),
            (Some(out_id), false) => {
                self.outputs.remove(id);
                self.out.retract(out_id);
            }
            (None, true) => {
                let out_id = self.out.create(facts.clone());
                self.outputs.insert(id, out_id);
            }
            (None, false) => {}
        }
    }

    fn retract(&mut self, _side: Side, id: TupleId) {
        if let Some(out_id) = self.outputs.remove(id) {
            self.out.retract(out_id);
        }
    }

    fn drain(&mut self, out: &mut Vec<Signal>) {
        self.out.drain(out);
    }
}
