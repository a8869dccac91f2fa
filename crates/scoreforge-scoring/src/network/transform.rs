//! Stateless one-to-one and one-to-many transformations.

use super::element::Facts;
use super::node::{Flattener, Mapper, Node, Side};
use super::tuple::{IdMap, OutputTuples, Signal, TupleId};

/// Replaces a tuple with the values of its mappers.
///
/// With `keep_input` the mapped values are appended instead (`expand`).
pub struct MapNode {
    mappers: Vec<Mapper>,
    keep_input: bool,
    outputs: IdMap<TupleId>,
    out: OutputTuples,
}

impl MapNode {
    pub fn map(mappers: Vec<Mapper>) -> Self {
        Self {
            mappers,
            keep_input: false,
            outputs: IdMap::default(),
            out: OutputTuples::new(),
        }
    }

    pub fn expand(mappers: Vec<Mapper>) -> Self {
        Self {
            keep_input: true,
            ..Self::map(mappers)
        }
    }

    fn apply(&self, facts: &Facts) -> Facts {
        let mapped = self.mappers.iter().map(|mapper| mapper(facts));
        if self.keep_input {
            facts.iter().cloned().chain(mapped).collect()
        } else {
            mapped.collect()
        }
    }
}

impl Node for MapNode {
    fn insert(&mut self, _side: Side, id: TupleId, facts: &Facts) {
        let out_id = self.out.create(self.apply(facts));
        self.outputs.insert(id, out_id);
    }

    fn update(&mut self, side: Side, id: TupleId, facts: &Facts) {
        match self.outputs.get(id).copied() {
            Some(out_id) => {
                let mapped = self.apply(facts);
                self.out.update(out_id, mapped);
            }
            None => self.insert(side, id, facts),
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

/// Replaces the last element of a tuple by each item it flattens into.
pub struct FlattenLastNode {
    flattener: Flattener,
    outputs: IdMap<Vec<TupleId>>,
    out: OutputTuples,
}

impl FlattenLastNode {
    pub fn new(flattener: Flattener) -> Self {
        Self {
            flattener,
            outputs: IdMap::default(),
            out: OutputTuples::new(),
        }
    }

    fn flatten(&self, facts: &Facts) -> Vec<Facts> {
        let Some((last, prefix)) = facts.split_last() else {
            return Vec::new();
        };
        (self.flattener)(last)
            .into_iter()
            .map(|item| prefix.iter().cloned().chain(std::iter::once(item)).collect())
            .collect()
    }
}

impl Node for FlattenLastNode {
    fn insert(&mut self, _side: Side, id: TupleId, facts: &Facts) {
        let ids = self
            .flatten(facts)
            .into_iter()
            .map(|item| self.out.create(item))
            .collect();
        self.outputs.insert(id, ids);
    }

    // Outputs are matched to items by position.
    fn update(&mut self, side: Side, id: TupleId, facts: &Facts) {
        let Some(mut ids) = self.outputs.remove(id) else {
            self.insert(side, id, facts);
            return;
        };
        let items = self.flatten(facts);
        for out_id in ids.split_off(items.len().min(ids.len())) {
            self.out.retract(out_id);
        }
        for (position, item) in items.into_iter().enumerate() {
            match ids.get(position) {
                Some(&out_id) => self.out.update(out_id, item),
                None => ids.push(self.out.create(item)),
            }
        }
        self.outputs.insert(id, ids);
    }

    fn retract(&mut self, _side: Side, id: TupleId) {
        for out_id in self.outputs.remove(id).unwrap_or_default() {
            self.out.retract(out_id);
        }
    }

    fn drain(&mut self, out: &mut Vec<Signal>) {
        self.out.drain(out);
    }
}
