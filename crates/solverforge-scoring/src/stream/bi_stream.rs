// Two-fact stream.

use super::arity_stream_macros::{impl_arity_stream, impl_join};

impl_arity_stream!(
    /// Stream of `(A, B)` tuples, produced by a join, `map2` or `group_by`.
    BiStream,
    [A: 0],
    B: 1
);

impl_join!(BiStream, [A, B] => TriStream);
