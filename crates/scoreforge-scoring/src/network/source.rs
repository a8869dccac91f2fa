use std::collections::HashMap;

use super::element::{Element, FactHandle, FactId, Facts};
use super::node::{Node, Side};
use super::tuple::{OutputTuples, Signal, TupleId};

/// Emits one uni tuple per instance of a domain class.
#[derive(Default)]
pub struct SourceNode {
    tuples: HashMap<FactId, TupleId>,
    out: OutputTuples,
}

impl SourceNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_fact(&mut self, handle: FactHandle) {
        let fact_id = handle.id();
        let facts: Facts = std::iter::once(Element::Fact(handle)).collect();
        match self.tuples.get(&fact_id) {
            Some(&id) => self.out.update(id, facts),
            None => {
                let id = self.out.create(facts);
                self.tuples.insert(fact_id, id);
            }
        }
    }

    pub fn update_fact(&mut self, handle: FactHandle) {
        self.insert_fact(handle);
    }

    pub fn retract_fact(&mut self, fact_id: FactId) {
        if let Some(id) = self.tuples.remove(&fact_id) {
            self.out.retract(id);
        }
    }
}

impl Node for SourceNode {
    fn insert(&mut self, _side: Side, _id: TupleId, _facts: &Facts) {}

    fn update(&mut self, _side: Side, _id: TupleId, _facts: &Facts) {}

    fn retract(&mut self, _side: Side, _id: TupleId) {}

    fn drain(&mut self, out: &mut Vec<Signal>) {
        self.out.drain(out);
    }

    fn as_source(&mut self) -> Option<&mut SourceNode> {
        Some(self)
    }
}
