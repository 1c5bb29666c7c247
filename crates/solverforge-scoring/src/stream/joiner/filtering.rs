// Arbitrary predicate over the left facts and the right fact.

/// Matches when `predicate(.., x)` holds. On a `BiStream<A, B>` joined with
/// `UniStream<X>` the predicate is `|a: &A, b: &B, x: &X| ...`.
pub fn filtering<F>(predicate: F) -> FilteringJoiner<F> {
    FilteringJoiner { predicate }
}

pub struct FilteringJoiner<F> {
    pub(super) predicate: F,
}
