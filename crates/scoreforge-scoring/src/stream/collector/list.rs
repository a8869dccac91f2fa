//! Collectors that gather the values of a group.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;
use std::marker::PhantomData;

use scoreforge_core::DomainObject;
use smallvec::{smallvec, SmallVec};

use crate::network::Element;
use crate::stream::function::{erase, ErasedFn, Token, TupleFn};

use super::{Accumulator, Collector};

/// Creates a collector of every value of `mapping`, in arrival order.
/// Duplicates are kept.
pub fn to_list<L, V, F>(mapping: F) -> ListCollector<L, V>
where
    L: 'static,
    V: Clone + DomainObject + Eq + Hash,
    F: TupleFn<L, V>,
{
    ListCollector {
        mapping: erase(mapping),
        _phantom: PhantomData,
    }
}

pub struct ListCollector<L, V> {
    mapping: ErasedFn<V>,
    _phantom: PhantomData<fn(L)>,
}

impl<L, V> Collector<L> for ListCollector<L, V>
where
    L: 'static,
    V: Clone + DomainObject + Eq + Hash,
{
    type Value = V;
    type Result = Vec<V>;
    type Accumulator = ListAccumulator<V>;

    fn extract(&self, facts: &[Element]) -> V {
        (self.mapping.func)(facts)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ListAccumulator { values: Vec::new() }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        smallvec![Token::Const("to_list"), self.mapping.token]
    }
}

pub struct ListAccumulator<V> {
    values: Vec<V>,
}

impl<V: Clone + Eq + Send> Accumulator<V, Vec<V>> for ListAccumulator<V> {
    fn accumulate(&mut self, value: &V) {
        self.values.push(value.clone());
    }

    fn retract(&mut self, value: &V) {
        if let Some(position) = self.values.iter().position(|v| v == value) {
            self.values.remove(position);
        }
    }

    fn finish(&self) -> Vec<V> {
        self.values.clone()
    }
}

/// Creates a collector of the distinct values of `mapping`.
pub fn to_set<L, V, F>(mapping: F) -> SetCollector<L, V>
where
    L: 'static,
    V: Ord + Clone + DomainObject + Hash,
    F: TupleFn<L, V>,
{
    SetCollector {
        mapping: erase(mapping),
        _phantom: PhantomData,
    }
}

pub struct SetCollector<L, V> {
    mapping: ErasedFn<V>,
    _phantom: PhantomData<fn(L)>,
}

impl<L, V> Collector<L> for SetCollector<L, V>
where
    L: 'static,
    V: Ord + Clone + DomainObject + Hash,
{
    type Value = V;
    type Result = BTreeSet<V>;
    type Accumulator = SetAccumulator<V>;

    fn extract(&self, facts: &[Element]) -> V {
        (self.mapping.func)(facts)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        SetAccumulator {
            counts: BTreeMap::new(),
        }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        smallvec![Token::Const("to_set"), self.mapping.token]
    }
}

pub struct SetAccumulator<V> {
    counts: BTreeMap<V, usize>,
}

impl<V: Ord + Clone + Send> Accumulator<V, BTreeSet<V>> for SetAccumulator<V> {
    fn accumulate(&mut self, value: &V) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &V) {
        if let Some(count) = self.counts.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }

    fn finish(&self) -> BTreeSet<V> {
        self.counts.keys().cloned().collect()
    }
}
