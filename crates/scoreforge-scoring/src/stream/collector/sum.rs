// Summing collectors.

use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{AddAssign, SubAssign};

use scoreforge_core::DomainObject;
use smallvec::{smallvec, SmallVec};

use crate::network::Element;
use crate::stream::function::{erase, ErasedFn, Token, TupleFn};

use super::{Accumulator, Collector};

// Creates a collector that sums the values of `mapping`.
//
// An empty group sums to `T::default()`.
pub fn sum<L, T, F>(mapping: F) -> SumCollector<L, T>
where
    L: 'static,
    T: Default + Copy + AddAssign + SubAssign + DomainObject + Eq + Hash,
    F: TupleFn<L, T>,
{
    SumCollector {
        mapping: erase(mapping),
        _phantom: PhantomData,
    }
}

// Collector that sums extracted values.
//
// Created by the [`sum()`] function.
pub struct SumCollector<L, T> {
    mapping: ErasedFn<T>,
    _phantom: PhantomData<fn(L)>,
}

impl<L, T> Collector<L> for SumCollector<L, T>
where
    L: 'static,
    T: Default + Copy + AddAssign + SubAssign + DomainObject + Eq + Hash,
{
    type Value = T;
    type Result = T;
    type Accumulator = SumAccumulator<T>;

    #[inline]
    fn extract(&self, facts: &[Element]) -> T {
        (self.mapping.func)(facts)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        SumAccumulator { sum: T::default() }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        smallvec![Token::Const("sum"), self.mapping.token]
    }
}

// Works with pre-extracted values, not tuples directly.
pub struct SumAccumulator<T> {
    sum: T,
}

impl<T> Accumulator<T, T> for SumAccumulator<T>
where
    T: Default + Copy + AddAssign + SubAssign + Send,
{
    #[inline]
    fn accumulate(&mut self, value: &T) {
        self.sum += *value;
    }

    #[inline]
    fn retract(&mut self, value: &T) {
        self.sum -= *value;
    }

    #[inline]
    fn finish(&self) -> T {
        self.sum
    }
}

/// The exact mean of a group: a sum and a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Average {
    pub sum: i64,
    pub count: usize,
}

impl Average {
    pub fn value(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }
}

// Creates a collector that averages the values of `mapping`.
//
// An empty group has no average.
pub fn average<L, V, F>(mapping: F) -> AverageCollector<L, V>
where
    L: 'static,
    V: Copy + Into<i64> + Send + Sync + 'static,
    F: TupleFn<L, V>,
{
    AverageCollector {
        mapping: erase(mapping),
        _phantom: PhantomData,
    }
}

pub struct AverageCollector<L, V> {
    mapping: ErasedFn<V>,
    _phantom: PhantomData<fn(L)>,
}

impl<L, V> Collector<L> for AverageCollector<L, V>
where
    L: 'static,
    V: Copy + Into<i64> + Send + Sync + 'static,
{
    type Value = i64;
    type Result = Option<Average>;
    type Accumulator = AverageAccumulator;

    fn extract(&self, facts: &[Element]) -> i64 {
        (self.mapping.func)(facts).into()
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        AverageAccumulator {
            average: Average { sum: 0, count: 0 },
        }
    }

    fn tokens(&self) -> SmallVec<[Token; 2]> {
        smallvec![Token::Const("average"), self.mapping.token]
    }
}

pub struct AverageAccumulator {
    average: Average,
}

impl Accumulator<i64, Option<Average>> for AverageAccumulator {
    fn accumulate(&mut self, value: &i64) {
        self.average.sum += value;
        self.average.count += 1;
    }

    fn retract(&mut self, value: &i64) {
        self.average.sum -= value;
        self.average.count = self.average.count.saturating_sub(1);
    }

    fn finish(&self) -> Option<Average> {
        (self.average.count > 0).then_some(self.average)
    }
}
