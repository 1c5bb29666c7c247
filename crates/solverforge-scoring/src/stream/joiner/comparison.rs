// Comparison joiners: ordered values, indexed by range.

use std::marker::PhantomData;

macro_rules! comparison_joiner {
    ($(#[$doc:meta])* $ctor:ident, $joiner:ident) => {
        $(#[$doc])*
        pub fn $ctor<FL, FR, V>(left: FL, right: FR) -> $joiner<FL, FR, V> {
            $joiner {
                left,
                right,
                _phantom: PhantomData,
            }
        }

        pub struct $joiner<FL, FR, V> {
            pub(super) left: FL,
            pub(super) right: FR,
            _phantom: PhantomData<fn() -> V>,
        }
    };
}

comparison_joiner!(
    /// Matches when `left(..) < right(x)`.
    less_than,
    LessThanJoiner
);
comparison_joiner!(
    /// Matches when `left(..) <= right(x)`.
    less_than_or_equal,
    LessThanOrEqualJoiner
);
comparison_joiner!(
    /// Matches when `left(..) > right(x)`.
    greater_than,
    GreaterThanJoiner
);
comparison_joiner!(
    /// Matches when `left(..) >= right(x)`.
    greater_than_or_equal,
    GreaterThanOrEqualJoiner
);
