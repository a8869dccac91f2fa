use std::collections::HashMap;

use super::element::Facts;
use super::node::{Node, Side};
use super::tuple::{IdMap, OutputTuples, Signal, TupleId};

struct DistinctEntry {
    count: usize,
    out_id: TupleId,
}

/// Collapses equal tuples into one, reference counting the duplicates.
#[derive(Default)]
pub struct DistinctNode {
    inputs: IdMap<Facts>,
    entries: HashMap<Facts, DistinctEntry>,
    out: OutputTuples,
}

impl DistinctNode {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, facts: &Facts) {
        match self.entries.get_mut(facts) {
            Some(entry) => entry.count += 1,
            None => {
                let out_id = self.out.create(facts.clone());
                self.entries
                    .insert(facts.clone(), DistinctEntry { count: 1, out_id });
            }
        }
    }

    fn remove(&mut self, facts: &Facts) {
        let Some(entry) = self.entries.get_mut(facts) else {
            return;
        };
        entry.count -= 1;
        if entry.count == 0 {
            let out_id = entry.out_id;
            self.entries.remove(facts);
            self.out.retract(out_id);
        }
    }
}

impl Node for DistinctNode {
    fn insert(&mut self, _side: Side, id: TupleId, facts: &Facts) {
        self.add(facts);
        self.inputs.insert(id, facts.clone());
    }

    fn update(&mut self, side: Side, id: TupleId, facts: &Facts) {
        let Some(old) = self.inputs.remove(id) else {
            self.insert(side, id, facts);
            return;
        };
        if old == *facts {
            // Same identity, possibly a fresher snapshot.
            if let Some(entry) = self.entries.get(facts) {
                self.out.update(entry.out_id, facts.clone());
            }
        } else {
            self.remove(&old);
            self.add(facts);
        }
        self.inputs.insert(id, facts.clone());
    }

    fn retract(&mut self, _side: Side, id: TupleId) {
        if let Some(old) = self.inputs.remove(id) {
            self.remove(&old);
        }
    }

    fn drain(&mut self, out: &mut Vec<Signal>) {
        self.out.drain(out);
    }
}
