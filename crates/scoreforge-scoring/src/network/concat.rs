use std::collections::HashMap;

use super::element::Facts;
use super::node::{Node, Side};
use super::tuple::{OutputTuples, Signal, TupleId};

/// Unions two parents of the same arity, keeping duplicates.
#[derive(Default)]
pub struct ConcatNode {
    outputs: HashMap<(Side, TupleId), TupleId>,
    out: OutputTuples,
}

impl ConcatNode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for ConcatNode {
    fn insert(&mut self, side: Side, id: TupleId, facts: &Facts) {
        let out_id = self.out.create(facts.clone());
        self.outputs.insert((side, id), out_id);
    }

    fn update(&mut self, side: Side, id: TupleId, facts: &Facts) {
        match self.outputs.get(&(side, id)) {
            Some(&out_id) => self.out.update(out_id, facts.clone()),
            None => self.insert(side, id, facts),
        }
    }

    fn retract(&mut self, side: Side, id: TupleId) {
        if let Some(out_id) = self.outputs.remove(&(side, id)) {
            self.out.retract(out_id);
        }
    }

    fn drain(&mut self, out: &mut Vec<Signal>) {
        self.out.drain(out);
    }
}
