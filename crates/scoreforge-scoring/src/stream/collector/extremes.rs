//! Minimum and maximum collectors.
//!
//! Values are kept in an ordered multiset so retracting the current
//! extreme falls back to the next one.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::marker::PhantomData;

use scoreforge_core::DomainObject;
use smallvec::{smallvec, SmallVec};

use crate::network::Element;
use crate::stream::function::{erase, ErasedFn, Token, TupleFn};

use super::{Accumulator, Collector};

/// Creates a collector of the smallest value of `mapping`, `None` when
/// the group is empty.
pub fn min<L, V, F>(mapping: F) -> ExtremeCollector<L, V>
where
    L: 'static,
    V: Ord + Clone + DomainObject + Hash,
    F: TupleFn<L, V>,
{
    ExtremeCollector {
        mapping: erase(mapping),
        largest: false,
        _phantom: PhantomData,
    }
}

/// Creates a collector of the largest value of `mapping`.
pub fn max<L, V, F>(mapping: F) -> ExtremeCollector<L, V>
where
    L: 'static,
    V: Ord + Clone + DomainObject + Hash,
    F: TupleFn<L, V>,
{
    ExtremeCollector {
        mapping: erase(mapping),
        largest: true,
        _phantom: PhantomData,
    }
}

pub struct ExtremeCollector<L, V> {
    mapping: ErasedFn<V>,
    largest: bool,
    _phantom: PhantomData<fn(L)>,
}

impl<L, V> Collector<L> for ExtremeCollector<L, V>
where
    L: 'static,
    V: Ord + Clone + DomainObject + Hash,
{
    type Value = V;
    type Result = Option<V>;
    type Accumulator = ExtremeAccumulator<V>;

    fn extract(&self, facts: &[Element]) -> V {
        (self.mapping.func)(facts)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ExtremeAccumulator {
            values: BTreeMap::new(),
            largest: self.largest,
        }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        let kind = if self.largest { "max" } else { "min" };
        smallvec![Token::Const(kind), self.mapping.token]
    }
}

pub struct ExtremeAccumulator<V> {
    values: BTreeMap<V, usize>,
    largest: bool,
}

impl<V: Ord + Clone + Send> Accumulator<V, Option<V>> for ExtremeAccumulator<V> {
    fn accumulate(&mut self, value: &V) {
        *self.values.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &V) {
        if let Some(count) = self.values.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.values.remove(value);
            }
        }
    }

    fn finish(&self) -> Option<V> {
        let entry = if self.largest {
            self.values.last_key_value()
        } else {
            self.values.first_key_value()
        };
        entry.map(|(value, _)| value.clone())
    }
}
