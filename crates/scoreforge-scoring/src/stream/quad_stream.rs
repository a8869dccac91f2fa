//! Streams of quadruples, the widest tuples a stream can carry.

impl_arity_stream!(
    /// A stream of `(A, B, C, D)` quadruples.
    QuadStream, QuadConstraintBuilder, [A: 0, B: 1, C: 2, D: 3]
);
impl_stream_flatten!(QuadStream, [A, B, C] D);
