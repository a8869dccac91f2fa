//! Counting collectors.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use smallvec::{smallvec, SmallVec};

use crate::network::Element;
use crate::stream::function::{erase, ErasedFn, Token, TupleFn};

use super::{Accumulator, Collector};

/// Creates a collector that counts the tuples of a group.
pub fn count<L>() -> CountCollector<L> {
    CountCollector {
        _phantom: PhantomData,
    }
}

/// A collector that counts tuples.
///
/// Created by the [`count()`] function.
pub struct CountCollector<L> {
    _phantom: PhantomData<fn(L)>,
}

impl<L: 'static> Collector<L> for CountCollector<L> {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _facts: &[Element]) {}

    fn create_accumulator(&self) -> Self::Accumulator {
        CountAccumulator { count: 0 }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        smallvec![Token::Const("count")]
    }
}

/// Accumulator for counting tuples.
pub struct CountAccumulator {
    count: usize,
}

impl Accumulator<(), usize> for CountAccumulator {
    #[inline]
    fn accumulate(&mut self, _: &()) {
        self.count += 1;
    }

    #[inline]
    fn retract(&mut self, _: &()) {
        self.count = self.count.saturating_sub(1);
    }

    #[inline]
    fn finish(&self) -> usize {
        self.count
    }
}

/// Creates a collector that counts the distinct values of `mapping`.
pub fn count_distinct<L, K, F>(mapping: F) -> CountDistinctCollector<L, K>
where
    L: 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    F: TupleFn<L, K>,
{
    CountDistinctCollector {
        mapping: erase(mapping),
        _phantom: PhantomData,
    }
}

/// A collector that counts distinct values.
pub struct CountDistinctCollector<L, K> {
    mapping: ErasedFn<K>,
    _phantom: PhantomData<fn(L)>,
}

impl<L, K> Collector<L> for CountDistinctCollector<L, K>
where
    L: 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    type Value = K;
    type Result = usize;
    type Accumulator = CountDistinctAccumulator<K>;

    fn extract(&self, facts: &[Element]) -> K {
        (self.mapping.func)(facts)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        CountDistinctAccumulator {
            counts: HashMap::new(),
        }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        smallvec![Token::Const("count_distinct"), self.mapping.token]
    }
}

pub struct CountDistinctAccumulator<K> {
    counts: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone + Send> Accumulator<K, usize> for CountDistinctAccumulator<K> {
    fn accumulate(&mut self, value: &K) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &K) {
        if let Some(count) = self.counts.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }

    fn finish(&self) -> usize {
        self.counts.len()
    }
}
