//! Hash join of an n-ary left parent with a uni right parent.

use std::collections::{HashMap, HashSet};

use super::element::Facts;
use super::node::{join_facts, JoinIndexer, Key, Node, Side};
use super::tuple::{IdMap, OutputTuples, Signal, TupleId};

struct LeftEntry {
    facts: Facts,
    key: Key,
    // right id -> output id
    matches: HashMap<TupleId, TupleId>,
}

struct RightEntry {
    facts: Facts,
    key: Key,
    lefts: HashSet<TupleId>,
}

/// Emits `left ++ right` for every pair with equal keys that passes the
/// residual filters. Either side may arrive first.
pub struct JoinNode {
    indexer: JoinIndexer,
    left: IdMap<LeftEntry>,
    right: IdMap<RightEntry>,
    left_index: HashMap<Key, HashSet<TupleId>>,
    right_index: HashMap<Key, HashSet<TupleId>>,
    out: OutputTuples,
}

impl JoinNode {
    pub fn new(indexer: JoinIndexer) -> Self {
        Self {
            indexer,
            left: IdMap::default(),
            right: IdMap::default(),
            left_index: HashMap::new(),
            right_index: HashMap::new(),
            out: OutputTuples::new(),
        }
    }

    fn insert_left(&mut self, id: TupleId, facts: &Facts) {
        let key = self.indexer.left_key(facts);
        let mut matches = HashMap::new();
        if let Some(rights) = self.right_index.get(&key) {
            for &right_id in rights {
                let Some(right) = self.right.get_mut(right_id) else {
                    continue;
                };
                if self.indexer.test(facts, &right.facts) {
                    let out_id = self.out.create(join_facts(facts, &right.facts));
                    matches.insert(right_id, out_id);
                    right.lefts.insert(id);
                }
            }
        }
        self.left_index.entry(key.clone()).or_default().insert(id);
        self.left.insert(
            id,
            LeftEntry {
                facts: facts.clone(),
                key,
                matches,
            },
        );
    }

    fn insert_right(&mut self, id: TupleId, facts: &Facts) {
        let key = self.indexer.right_key(facts);
        let mut lefts = HashSet::new();
        if let Some(left_ids) = self.left_index.get(&key) {
            for &left_id in left_ids {
                let Some(left) = self.left.get_mut(left_id) else {
                    continue;
                };
                if self.indexer.test(&left.facts, facts) {
                    let out_id = self.out.create(join_facts(&left.facts, facts));
                    left.matches.insert(id, out_id);
                    lefts.insert(left_id);
                }
            }
        }
        self.right_index.entry(key.clone()).or_default().insert(id);
        self.right.insert(
            id,
            RightEntry {
                facts: facts.clone(),
                key,
                lefts,
            },
        );
    }

    fn update_left(&mut self, id: TupleId, facts: &Facts) {
        let key = self.indexer.left_key(facts);
        let same_key = self.left.get(id).is_some_and(|entry| entry.key == key);
        if !same_key {
            self.retract_left(id);
            self.insert_left(id, facts);
            return;
        }
        let Some(entry) = self.left.get_mut(id) else {
            return;
        };
        entry.facts = facts.clone();
        let rights: Vec<TupleId> = self
            .right_index
            .get(&key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        for right_id in rights {
            let Some(right) = self.right.get_mut(right_id) else {
                continue;
            };
            let passes = self.indexer.test(facts, &right.facts);
            match (entry.matches.get(&right_id).copied(), passes) {
                (Some(out_id), true) => self.out.update(out_id, join_facts(facts, &right.facts)),
                (Some(out_id), false) => {
                    entry.matches.remove(&right_id);
                    right.lefts.remove(&id);
                    self.out.retract(out_id);
                }
                (None, true) => {
                    let out_id = self.out.create(join_facts(facts, &right.facts));
                    entry.matches.insert(right_id, out_id);
                    right.lefts.insert(id);
                }
                (None, false) => {}
            }
        }
    }

    fn update_right(&mut self, id: TupleId, facts: &Facts) {
        let key = self.indexer.right_key(facts);
        let same_key = self.right.get(id).is_some_and(|entry| entry.key == key);
        if !same_key {
            self.retract_right(id);
            self.insert_right(id, facts);
            return;
        }
        let Some(entry) = self.right.get_mut(id) else {
            return;
        };
        entry.facts = facts.clone();
        let lefts: Vec<TupleId> = self
            .left_index
            .get(&key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        for left_id in lefts {
            let Some(left) = self.left.get_mut(left_id) else {
                continue;
            };
            let passes = self.indexer.test(&left.facts, facts);
            match (left.matches.get(&id).copied(), passes) {
                (Some(out_id), true) => self.out.update(out_id, join_facts(&left.facts, facts)),
                (Some(out_id), false) => {
                    left.matches.remove(&id);
                    entry.lefts.remove(&left_id);
                    self.out.retract(out_id);
                }
                (None, true) => {
                    let out_id = self.out.create(join_facts(&left.facts, facts));
                    left.matches.insert(id, out_id);
                    entry.lefts.insert(left_id);
                }
                (None, false) => {}
            }
        }
    }

    fn retract_left(&mut self, id: TupleId) {
        let Some(entry) = self.left.remove(id) else {
            return;
        };
        remove_from_index(&mut self.left_index, &entry.key, id);
        for (right_id, out_id) in entry.matches {
            if let Some(right) = self.right.get_mut(right_id) {
                right.lefts.remove(&id);
            }
            self.out.retract(out_id);
        }
    }

    fn retract_right(&mut self, id: TupleId) {
        let Some(entry) = self.right.remove(id) else {
            return;
        };
        remove_from_index(&mut self.right_index, &entry.key, id);
        for left_id in entry.lefts {
            if let Some(out_id) = self
                .left
                .get_mut(left_id)
                .and_then(|left| left.matches.remove(&id))
            {
                self.out.retract(out_id);
            }
        }
    }
}

pub(super) fn remove_from_index(index: &mut HashMap<Key, HashSet<TupleId>>, key: &Key, id: TupleId) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

impl Node for JoinNode {
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
