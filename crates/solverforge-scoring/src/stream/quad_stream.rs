// Four-fact stream. The widest tuple; it cannot be joined further.

use super::arity_stream_macros::impl_arity_stream;

impl_arity_stream!(
    /// Stream of `(A, B, C, D)` tuples.
    QuadStream,
    [A: 0, B: 1, C: 2],
    D: 3
);
