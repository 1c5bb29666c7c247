// Three-fact stream.

use super::arity_stream_macros::{impl_arity_stream, impl_join};

impl_arity_stream!(
    /// Stream of `(A, B, C)` tuples.
    TriStream,
    [A: 0, B: 1],
    C: 2
);

impl_join!(TriStream, [A, B, C] => QuadStream);
