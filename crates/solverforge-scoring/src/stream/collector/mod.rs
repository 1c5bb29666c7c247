// Collectors for grouping and aggregating facts.
//
// A collector extracts a value from each group member and folds it into an
// accumulator that can also take the value back out, so a group node can
// retract one member without recomputing the whole group.

mod count;
mod erased;
mod min_max;
mod sum;
mod uni;


pub use count::{count, CountAccumulator, CountCollector};
pub use min_max::{max, min, MaxAccumulator, MaxCollector, MinAccumulator, MinCollector};
pub use sum::{sum, SumAccumulator, SumCollector};
pub use uni::{Accumulator, UniCollector};

pub(crate) use erased::{erase, ErasedAccumulator, ErasedCollector};
