//! Streams of single elements.
//!
//! Besides the common operations a uni stream can test for other instances
//! of its own class (`if_exists_other`) and be completed with the missing
//! instances of its class (`complement`).

use std::sync::Arc;

use crate::network::Element;

use super::joiner::{identity, Joiner};

impl_arity_stream!(
    /// A stream of single elements of type `A`.
    UniStream, UniConstraintBuilder, [A: 0]
);
impl_stream_join!(UniStream => BiStream, [A]);
impl_stream_flatten!(UniStream, [] A);

impl<'f, S, A> UniStream<'f, S, A>
where
    S: scoreforge_core::PlanningSolution,
    A: 'static,
{
    /// Keeps the elements for which another assigned `A` matches `joiner`.
    ///
    /// Every call creates its own node, even with an equal joiner.
    pub fn if_exists_other(self, joiner: Joiner<(A,), A>) -> Self {
        let other = self.factory.for_each::<A>();
        self.exists_other(true, other, joiner)
    }

    pub fn if_not_exists_other(self, joiner: Joiner<(A,), A>) -> Self {
        let other = self.factory.for_each::<A>();
        self.exists_other(false, other, joiner)
    }

    pub fn if_exists_other_including_unassigned(self, joiner: Joiner<(A,), A>) -> Self {
        let other = self.factory.for_each_including_unassigned::<A>();
        self.exists_other(true, other, joiner)
    }

    pub fn if_not_exists_other_including_unassigned(self, joiner: Joiner<(A,), A>) -> Self {
        let other = self.factory.for_each_including_unassigned::<A>();
        self.exists_other(false, other, joiner)
    }

    fn exists_other(self, should_exist: bool, other: Self, joiner: Joiner<(A,), A>) -> Self {
        let joiner = joiner.with_filter(
            Arc::new(|left: &[Element], right: &[Element]| left[0] != right[0]),
            self.factory.fresh_token(),
        );
        self.exists(should_exist, other, joiner)
    }

    /// Adds every assigned `A` that is not in this stream.
    ///
    /// The result holds each instance at least once: the tuples of this
    /// stream followed by the instances it does not contain.
    pub fn complement(self) -> Self {
        let missing = self
            .factory
            .for_each::<A>()
            .if_not_exists_stream(self, identity());
        self.concat(missing)
    }
}
