// Bridges typed collectors to the untyped group node.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::fact::{Fact, FactRef, Facts};

use super::{Accumulator, UniCollector};

pub(crate) type Token = Box<dyn Any + Send>;

pub(crate) trait ErasedCollector: Send + Sync {
    fn create(&self) -> Box<dyn ErasedAccumulator>;
}

pub(crate) trait ErasedAccumulator: Send {
    /// Folds in the member and returns the token needed to take it out again.
    fn accumulate(&mut self, facts: Facts<'_>) -> Token;

    /// Returns false if the token was not produced by this collector.
    fn retract(&mut self, token: Token) -> bool;

    fn result(&self) -> FactRef;
}

struct Erased<A, C> {
    collector: Arc<C>,
    _phantom: PhantomData<fn(&A)>,
}

struct ErasedAcc<A, C: UniCollector<A>> {
    collector: Arc<C>,
    acc: C::Accumulator,
    _phantom: PhantomData<fn(&A)>,
}

/// Wraps a collector over the first fact of each member tuple.
pub(crate) fn erase<A, C>(collector: C) -> Arc<dyn ErasedCollector>
where
    A: 'static,
    C: UniCollector<A> + 'static,
    C::Result: Fact,
{
    Arc::new(Erased {
        collector: Arc::new(collector),
        _phantom: PhantomData,
    })
}

impl<A, C> ErasedCollector for Erased<A, C>
where
    A: 'static,
    C: UniCollector<A> + 'static,
    C::Result: Fact,
{
    fn create(&self) -> Box<dyn ErasedAccumulator> {
        Box::new(ErasedAcc::<A, C> {
            acc: self.collector.create_accumulator(),
            collector: self.collector.clone(),
            _phantom: PhantomData,
        })
    }
}

impl<A, C> ErasedAccumulator for ErasedAcc<A, C>
where
    A: 'static,
    C: UniCollector<A> + 'static,
    C::Result: Fact,
{
    fn accumulate(&mut self, facts: Facts<'_>) -> Token {
        let value = self.collector.extract(facts.get::<A>(0));
        self.acc.accumulate(&value);
        Box::new(value)
    }

    fn retract(&mut self, token: Token) -> bool {
        match token.downcast::<C::Value>() {
            Ok(value) => {
                self.acc.retract(&value);
                true
            }
            Err(_) => false,
        }
    }

    fn result(&self) -> FactRef {
        FactRef::new(self.acc.finish())
    }
}
