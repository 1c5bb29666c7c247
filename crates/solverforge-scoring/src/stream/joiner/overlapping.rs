// Interval overlap joiner.

use std::marker::PhantomData;

/// Matches when the half-open intervals `[start_left, end_left)` and
/// `[start_right, end_right)` overlap. Touching intervals do not overlap.
pub fn overlapping<SL, EL, SR, ER, V>(
    start_left: SL,
    end_left: EL,
    start_right: SR,
    end_right: ER,
) -> OverlappingJoiner<SL, EL, SR, ER, V> {
    OverlappingJoiner {
        start_left,
        end_left,
        start_right,
        end_right,
        _phantom: PhantomData,
    }
}

pub struct OverlappingJoiner<SL, EL, SR, ER, V> {
    pub(super) start_left: SL,
    pub(super) end_left: EL,
    pub(super) start_right: SR,
    pub(super) end_right: ER,
    pub(super) _phantom: PhantomData<fn() -> V>,
}
