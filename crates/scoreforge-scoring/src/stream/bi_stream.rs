//! Streams of pairs.

impl_arity_stream!(
    /// A stream of `(A, B)` pairs, usually the result of a join.
    BiStream, BiConstraintBuilder, [A: 0, B: 1]
);
impl_stream_join!(BiStream => TriStream, [A, B]);
impl_stream_flatten!(BiStream, [A] B);
