//! Tuple lifecycle and per-node output storage.

use super::element::Facts;

/// Slot index of a tuple inside the node that produced it.
pub type TupleId = usize;

/// Lifecycle of an output tuple within one propagation pass.
///
/// `Creating` and `Dying` tuples are never visible downstream; they are
/// resolved when the owning node drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleState {
    /// Created since the last drain, not yet announced.
    Creating,
    /// Announced and unchanged since the last drain.
    Ok,
    /// Announced and changed since the last drain.
    Updating,
    /// Announced and retracted since the last drain.
    Dying,
    /// Created and retracted before it was ever announced.
    Aborting,
}

/// One change announced by a node to its children.
#[derive(Debug, Clone)]
pub enum Signal {
    Insert(TupleId, Facts),
    Update(TupleId, Facts),
    Retract(TupleId),
}

struct TupleSlot {
    facts: Facts,
    state: TupleState,
}

/// The output tuples of one node.
///
/// Changes are buffered as state transitions and announced in one batch by
/// [`OutputTuples::drain`]: retracts first, then updates, then inserts.
/// Slots of dead tuples are recycled only after they were drained.
#[derive(Default)]
pub struct OutputTuples {
    slots: Vec<Option<TupleSlot>>,
    free: Vec<TupleId>,
    dirty: Vec<TupleId>,
}

impl OutputTuples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, facts: Facts) -> TupleId {
        let slot = TupleSlot {
            facts,
            state: TupleState::Creating,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(slot);
                id
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.dirty.push(id);
        id
    }

    /// Replaces the facts of a live tuple.
    pub fn update(&mut self, id: TupleId, facts: Facts) {
        let slot = self.live_slot(id);
        slot.facts = facts;
        if slot.state == TupleState::Ok {
            slot.state = TupleState::Updating;
            self.dirty.push(id);
        }
    }

    pub fn retract(&mut self, id: TupleId) {
        let slot = self.live_slot(id);
        match slot.state {
            TupleState::Creating => slot.state = TupleState::Aborting,
            TupleState::Updating => slot.state = TupleState::Dying,
            TupleState::Ok => {
                slot.state = TupleState::Dying;
                self.dirty.push(id);
            }
            TupleState::Dying | TupleState::Aborting => {}
        }
    }

    pub fn facts(&self, id: TupleId) -> &Facts {
        match self.slots.get(id).and_then(Option::as_ref) {
            Some(slot) => &slot.facts,
            None => panic!("Tuple {} is not live", id),
        }
    }

    pub fn state(&self, id: TupleId) -> Option<TupleState> {
        self.slots.get(id).and_then(Option::as_ref).map(|s| s.state)
    }

    pub fn has_pending(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Announces every buffered change and settles all tuples to `Ok`.
    pub fn drain(&mut self, out: &mut Vec<Signal>) {
        if self.dirty.is_empty() {
            return;
        }
        let dirty = std::mem::take(&mut self.dirty);
        let mut updates = Vec::new();
        let mut inserts = Vec::new();
        for &id in &dirty {
            let Some(slot) = self.slots[id].as_mut() else {
                continue;
            };
            let state = slot.state;
            match state {
                TupleState::Dying => {
                    out.push(Signal::Retract(id));
                    self.slots[id] = None;
                    self.free.push(id);
                }
                TupleState::Aborting => {
                    self.slots[id] = None;
                    self.free.push(id);
                }
                TupleState::Updating => {
                    slot.state = TupleState::Ok;
                    updates.push(Signal::Update(id, slot.facts.clone()));
                }
                TupleState::Creating => {
                    slot.state = TupleState::Ok;
                    inserts.push(Signal::Insert(id, slot.facts.clone()));
                }
                TupleState::Ok => {}
            }
        }
        out.append(&mut updates);
        out.append(&mut inserts);
        self.dirty = dirty;
        self.dirty.clear();
    }

    fn live_slot(&mut self, id: TupleId) -> &mut TupleSlot {
        match self.slots.get_mut(id).and_then(Option::as_mut) {
            Some(slot) => slot,
            None => panic!("Tuple {} is not live", id),
        }
    }
}

/// Dense map keyed by the tuple ids of a parent node.
pub struct IdMap<V> {
    values: Vec<Option<V>>,
}

impl<V> Default for IdMap<V> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<V> IdMap<V> {
    pub fn insert(&mut self, id: TupleId, value: V) {
        if id >= self.values.len() {
            self.values.resize_with(id + 1, || None);
        }
        self.values[id] = Some(value);
    }

    pub fn get(&self, id: TupleId) -> Option<&V> {
        self.values.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: TupleId) -> Option<&mut V> {
        self.values.get_mut(id).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: TupleId) -> Option<V> {
        self.values.get_mut(id).and_then(Option::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TupleId, &V)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(id, v)| v.as_ref().map(|v| (id, v)))
    }
}
