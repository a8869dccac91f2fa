//! Streams of triples.

impl_arity_stream!(
    /// A stream of `(A, B, C)` triples.
    TriStream, TriConstraintBuilder, [A: 0, B: 1, C: 2]
);
impl_stream_join!(TriStream => QuadStream, [A, B, C]);
impl_stream_flatten!(TriStream, [A, B] C);
