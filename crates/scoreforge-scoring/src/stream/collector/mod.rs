// Collectors for grouping and aggregating tuples.
//
// A collector extracts a value from every tuple of a group and folds it
// into an accumulator that supports retraction, so a group result is kept
// up to date as tuples come and go.

mod count;
mod extremes;
mod list;
mod sum;

#[cfg(test)]
mod tests;

pub use count::{count, count_distinct, CountAccumulator, CountCollector, CountDistinctCollector};
pub use extremes::{max, min, ExtremeCollector};
pub use list::{to_list, to_set, ListCollector, SetCollector};
pub use sum::{average, sum, Average, AverageCollector, SumCollector};

use std::any::Any;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use scoreforge_core::DomainObject;
use smallvec::SmallVec;

use crate::network::{Element, ErasedAccumulator, ErasedCollector};

use super::function::Token;

// Accumulates extracted values with support for retraction.
pub trait Accumulator<V, R>: Send {
    fn accumulate(&mut self, value: &V);

    fn retract(&mut self, value: &V);

    fn finish(&self) -> R;
}

// A collector over tuples typed by the marker `L`.
pub trait Collector<L>: Send + Sync + 'static {
    // The value extracted from one tuple.
    type Value: Send + Sync + 'static;

    // The aggregated result of a group.
    type Result: DomainObject + Eq + Hash;

    type Accumulator: Accumulator<Self::Value, Self::Result> + 'static;

    fn extract(&self, facts: &[Element]) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;

    // Identity of the collector for node sharing.
    fn tokens(&self) -> SmallVec<[Token; 2]>;
}

struct CollectorAdapter<L, C> {
    collector: C,
    _phantom: PhantomData<fn(L)>,
}

impl<L: 'static, C: Collector<L>> ErasedCollector for CollectorAdapter<L, C> {
    fn extract(&self, facts: &[Element]) -> Box<dyn Any + Send + Sync> {
        Box::new(self.collector.extract(facts))
    }

    fn create_accumulator(&self) -> Box<dyn ErasedAccumulator> {
        Box::new(AccumulatorAdapter::<C::Value, C::Result, C::Accumulator> {
            accumulator: self.collector.create_accumulator(),
            _phantom: PhantomData,
        })
    }
}

struct AccumulatorAdapter<V, R, A> {
    accumulator: A,
    _phantom: PhantomData<fn(&V) -> R>,
}

impl<V, R, A> ErasedAccumulator for AccumulatorAdapter<V, R, A>
where
    V: 'static,
    R: DomainObject + Eq + Hash,
    A: Accumulator<V, R>,
{
    fn accumulate(&mut self, value: &(dyn Any + Send + Sync)) {
        if let Some(value) = value.downcast_ref::<V>() {
            self.accumulator.accumulate(value);
        }
    }

    fn retract(&mut self, value: &(dyn Any + Send + Sync)) {
        if let Some(value) = value.downcast_ref::<V>() {
            self.accumulator.retract(value);
        }
    }

    fn result(&self) -> Element {
        Element::value(self.accumulator.finish())
    }
}

// Erases a typed collector for a group node.
pub(crate) fn erase_collector<L: 'static, C: Collector<L>>(
    collector: C,
) -> (Arc<dyn ErasedCollector>, SmallVec<[Token; 2]>) {
    let tokens = collector.tokens();
    let erased: Arc<dyn ErasedCollector> = Arc::new(CollectorAdapter {
        collector,
        _phantom: PhantomData,
    });
    (erased, tokens)
}
