//! Grouping with incremental accumulators.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::element::{Element, Facts};
use super::node::{Key, Mapper, Node, Side};
use super::tuple::{IdMap, OutputTuples, Signal, TupleId};

/// Type-erased collector, as stored in the network.
pub trait ErasedCollector: Send + Sync {
    /// Extracts the value this tuple contributes.
    fn extract(&self, facts: &[Element]) -> Box<dyn Any + Send + Sync>;

    fn create_accumulator(&self) -> Box<dyn ErasedAccumulator>;
}

/// Type-erased accumulator of one group.
pub trait ErasedAccumulator: Send {
    fn accumulate(&mut self, value: &(dyn Any + Send + Sync));

    fn retract(&mut self, value: &(dyn Any + Send + Sync));

    fn result(&self) -> Element;
}

struct GroupInput {
    key: Key,
    values: Vec<Box<dyn Any + Send + Sync>>,
}

struct Group {
    // Latest snapshot of the key; the map keeps the first equal one.
    key: Key,
    count: usize,
    accumulators: Vec<Box<dyn ErasedAccumulator>>,
    out_id: Option<TupleId>,
}

/// Emits one `keys ++ results` tuple per non-empty group.
///
/// Groups are recomputed when the node drains, so a burst of changes to
/// one group yields at most one downstream change.
pub struct GroupNode {
    keys: Vec<Mapper>,
    collectors: Vec<Arc<dyn ErasedCollector>>,
    inputs: IdMap<GroupInput>,
    groups: HashMap<Key, Group>,
    dirty: HashSet<Key>,
    out: OutputTuples,
}

impl GroupNode {
    pub fn new(keys: Vec<Mapper>, collectors: Vec<Arc<dyn ErasedCollector>>) -> Self {
        Self {
            keys,
            collectors,
            inputs: IdMap::default(),
            groups: HashMap::new(),
            dirty: HashSet::new(),
            out: OutputTuples::new(),
        }
    }

    fn settle_group(&mut self, key: Key) {
        let Some(group) = self.groups.get_mut(&key) else {
            return;
        };
        if group.count == 0 {
            if let Some(out_id) = group.out_id {
                self.out.retract(out_id);
            }
            self.groups.remove(&key);
            return;
        }
        let facts: Facts = group
            .key
            .iter()
            .cloned()
            .chain(group.accumulators.iter().map(|acc| acc.result()))
            .collect();
        match group.out_id {
            None => group.out_id = Some(self.out.create(facts)),
            Some(out_id) => {
                let current = self.out.facts(out_id);
                let unchanged = current.len() == facts.len()
                    && current.iter().zip(&facts).all(|(a, b)| a.same_snapshot(b));
                if !unchanged {
                    self.out.update(out_id, facts);
                }
            }
        }
    }
}

impl Node for GroupNode {
    fn insert(&mut self, _side: Side, id: TupleId, facts: &Facts) {
        let key: Key = self.keys.iter().map(|key| key(facts)).collect();
        let values: Vec<_> = self.collectors.iter().map(|c| c.extract(facts)).collect();
        let collectors = &self.collectors;
        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            key: key.clone(),
            count: 0,
            accumulators: collectors.iter().map(|c| c.create_accumulator()).collect(),
            out_id: None,
        });
        group.key = key.clone();
        group.count += 1;
        for (acc, value) in group.accumulators.iter_mut().zip(&values) {
            acc.accumulate(&**value);
        }
        self.dirty.insert(key.clone());
        self.inputs.insert(id, GroupInput { key, values });
    }

    fn update(&mut self, side: Side, id: TupleId, facts: &Facts) {
        self.retract(side, id);
        self.insert(side, id, facts);
    }

    fn retract(&mut self, _side: Side, id: TupleId) {
        let Some(input) = self.inputs.remove(id) else {
            return;
        };
        if let Some(group) = self.groups.get_mut(&input.key) {
            group.count -= 1;
            for (acc, value) in group.accumulators.iter_mut().zip(&input.values) {
                acc.retract(&**value);
            }
        }
        self.dirty.insert(input.key);
    }

    fn drain(&mut self, out: &mut Vec<Signal>) {
        for key in std::mem::take(&mut self.dirty) {
            self.settle_group(key);
        }
        self.out.drain(out);
    }
}
