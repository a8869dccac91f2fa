//! Existence and non-existence of matching right tuples.

use std::collections::{HashMap, HashSet};

use super::element::Facts;
use super::join::remove_from_index;
use super::node::{JoinIndexer, Key, Node, Side};
use super::tuple::{IdMap, OutputTuples, Signal, TupleId};

struct LeftEntry {
    facts: Facts,
    key: Key,
    count: usize,
    out_id: Option<TupleId>,
}

struct RightEntry {
    facts: Facts,
    key: Key,
}

/// Passes a left tuple through while it has (or lacks) a matching right tuple.
///
/// Each left tuple keeps a counter of matching right tuples; it is visible
/// downstream iff `should_exist == (count > 0)`.
pub struct ExistsNode {
    should_exist: bool,
    indexer: JoinIndexer,
    left: IdMap<LeftEntry>,
    right: IdMap<RightEntry>,
    left_index: HashMap<Key, HashSet<TupleId>>,
    right_index: HashMap<Key, HashSet<TupleId>>,
    out: OutputTuples,
}

impl ExistsNode {
    pub fn new(should_exist: bool, indexer: JoinIndexer) -> Self {
        Self {
            should_exist,
            indexer,
            left: IdMap::default(),
            right: IdMap::default(),
            left_index: HashMap::new(),
            right_index: HashMap::new(),
            out: OutputTuples::new(),
        }
    }

    fn count_matches(&self, key: &Key, facts: &Facts) -> usize {
        self.right_index.get(key).map_or(0, |ids| {
            ids.iter()
                .filter_map(|&id| self.right.get(id))
                .filter(|right| self.indexer.test(facts, &right.facts))
                .count()
        })
    }

    // Brings the output of one left tuple in line with its counter.
    fn refresh(&mut self, id: TupleId, facts_changed: bool) {
        let should_exist = self.should_exist;
        let Some(entry) = self.left.get_mut(id) else {
            return;
        };
        let visible = should_exist == (entry.count > 0);
        match (entry.out_id, visible) {
            (Some(out_id), true) => {
                if facts_changed {
                    self.out.update(out_id, entry.facts.clone());
                }
            }
            (Some(out_id), false) => {
                entry.out_id = None;
                self.out.retract(out_id);
            }
            (None, true) => entry.out_id = Some(self.out.create(entry.facts.clone())),
            (None, false) => {}
        }
    }

    fn insert_left(&mut self, id: TupleId, facts: &Facts) {
        let key = self.indexer.left_key(facts);
        let count = self.count_matches(&key, facts);
        self.left_index.entry(key.clone()).or_default().insert(id);
        self.left.insert(
            id,
            LeftEntry {
                facts: facts.clone(),
                key,
                count,
                out_id: None,
            },
        );
        self.refresh(id, false);
    }

    fn update_left(&mut self, id: TupleId, facts: &Facts) {
        let key = self.indexer.left_key(facts);
        let count = self.count_matches(&key, facts);
        let Some(entry) = self.left.get_mut(id) else {
            self.insert_left(id, facts);
            return;
        };
        let old_key = std::mem::replace(&mut entry.key, key.clone());
        entry.facts = facts.clone();
        entry.count = count;
        if old_key != key {
            remove_from_index(&mut self.left_index, &old_key, id);
            self.left_index.entry(key).or_default().insert(id);
        }
        self.refresh(id, true);
    }

    fn retract_left(&mut self, id: TupleId) {
        let Some(entry) = self.left.remove(id) else {
            return;
        };
        remove_from_index(&mut self.left_index, &entry.key, id);
        if let Some(out_id) = entry.out_id {
            self.out.retract(out_id);
        }
    }

    // Applies the change of one right tuple from `old` to `new` to the
    // counters of the affected left tuples.
    fn apply_right(&mut self, old: Option<&RightEntry>, new: Option<&RightEntry>) {
        let mut deltas: HashMap<TupleId, isize> = HashMap::new();
        if let Some(old) = old {
            for &left_id in self.left_index.get(&old.key).into_iter().flatten() {
                if let Some(left) = self.left.get(left_id) {
                    if self.indexer.test(&left.facts, &old.facts) {
                        *deltas.entry(left_id).or_default() -= 1;
                    }
                }
            }
        }
        if let Some(new) = new {
            for &left_id in self.left_index.get(&new.key).into_iter().flatten() {
                if let Some(left) = self.left.get(left_id) {
                    if self.indexer.test(&left.facts, &new.facts) {
                        *deltas.entry(left_id).or_default() += 1;
                    }
                }
            }
        }
        for (left_id, delta) in deltas {
            if delta == 0 {
                continue;
            }
            if let Some(left) = self.left.get_mut(left_id) {
                left.count = left.count.saturating_add_signed(delta);
            }
            self.refresh(left_id, false);
        }
    }

    fn insert_right(&mut self, id: TupleId, facts: &Facts) {
        let entry = RightEntry {
            facts: facts.clone(),
            key: self.indexer.right_key(facts),
        };
        self.apply_right(None, Some(&entry));
        self.right_index.entry(entry.key.clone()).or_default().insert(id);
        self.right.insert(id, entry);
    }

    fn update_right(&mut self, id: TupleId, facts: &Facts) {
        let Some(old) = self.right.remove(id) else {
            self.insert_right(id, facts);
            return;
        };
        let new = RightEntry {
            facts: facts.clone(),
            key: self.indexer.right_key(facts),
        };
        self.apply_right(Some(&old), Some(&new));
        if old.key != new.key {
            remove_from_index(&mut self.right_index, &old.key, id);
            self.right_index.entry(new.key.clone()).or_default().insert(id);
        }
        self.right.insert(id, new);
    }

    fn retract_right(&mut self, id: TupleId) {
        let Some(old) = self.right.remove(id) else {
            return;
        };
        remove_from_index(&mut self.right_index, &old.key, id);
        self.apply_right(Some(&old), None);
    }
}

impl Node for ExistsNode {
    fn insert(&mut self, side: Side, id: TupleId, facts: &Facts) {
        match side {
            Side::Left => self.insert_left(id, facts),
            Side::Right => self.insert_right(id, facts),
        }
    }

    fn update(&mut self, side: Side, id: TupleId, facts: &Facts) {
        match side {
            Side::Left => self.update_left(id, facts),
            Side::Right => self.update_right(id, facts),
        }
    }

    fn retract(&mut self, side: Side, id: TupleId) {
        match side {
            Side::Left => self.retract_left(id),
            Side::Right => self.retract_right(id),
        }
    }

    fn drain(&mut self, out: &mut Vec<Signal>) {
        self.out.drain(out);
    }
}
