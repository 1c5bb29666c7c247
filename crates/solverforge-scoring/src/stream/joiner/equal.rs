// Equality joiners. These are the only joiners that become index keys.

use std::marker::PhantomData;

/// Matches when both sides yield the same key. For joining a stream with
/// another stream of the same fact type.
pub fn equal<F: Clone, K>(key: F) -> EqualJoiner<F, F, K> {
    EqualJoiner {
        left: key.clone(),
        right: key,
        _phantom: PhantomData,
    }
}

/// Matches when `left(..) == right(x)`. The left function receives every
/// fact of the left tuple.
pub fn equal_bi<FL, FR, K>(left: FL, right: FR) -> EqualJoiner<FL, FR, K> {
    EqualJoiner {
        left,
        right,
        _phantom: PhantomData,
    }
}

pub struct EqualJoiner<FL, FR, K> {
    pub(super) left: FL,
    pub(super) right: FR,
    _phantom: PhantomData<fn() -> K>,
}
