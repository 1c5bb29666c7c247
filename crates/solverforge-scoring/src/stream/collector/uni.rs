// Typed collector traits.

/// Extracts a value from each fact of type `A` and builds accumulators for it.
///
/// The extracted `Value` doubles as the undo token: the group node keeps it
/// next to the member and hands it back to [`Accumulator::retract`].
pub trait UniCollector<A>: Send + Sync {
    type Value: Send + 'static;
    type Result;
    type Accumulator: Accumulator<Self::Value, Self::Result>;

    fn extract(&self, entity: &A) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// Retractable fold over extracted values.
pub trait Accumulator<V, R>: Send {
    fn accumulate(&mut self, value: &V);

    /// Removes a value previously passed to `accumulate`.
    fn retract(&mut self, value: &V);

    fn finish(&self) -> R;
}
