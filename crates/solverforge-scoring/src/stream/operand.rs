//! Identity of user-supplied functions, used to decide node sharing.

use std::any::TypeId;
use std::mem::size_of;
use std::sync::Arc;

/// How two operands are recognized as the same function.
///
/// A zero-sized closure or fn item is fully described by its type. A
/// capturing closure is only equal to itself, so it is identified by the
/// allocation that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum FnIdentity {
    Static(TypeId),
    Instance(usize),
    Composite(&'static str, Vec<FnIdentity>),
}

impl FnIdentity {
    pub(crate) fn of<U: 'static>(allocation: *const ()) -> Self {
        if size_of::<U>() == 0 {
            FnIdentity::Static(TypeId::of::<U>())
        } else {
            FnIdentity::Instance(allocation as usize)
        }
    }

    /// Several functions lowered into one operand. Shared only when every
    /// part is identified by type.
    pub(crate) fn composite(tag: &'static str, parts: Vec<FnIdentity>, allocation: *const ()) -> Self {
        if parts.iter().all(|p| matches!(p, FnIdentity::Static(_))) {
            FnIdentity::Composite(tag, parts)
        } else {
            FnIdentity::Instance(allocation as usize)
        }
    }

    pub(crate) fn tag(tag: &'static str) -> Self {
        FnIdentity::Composite(tag, Vec::new())
    }
}

/// An erased function together with its identity.
#[derive(Clone)]
pub(crate) struct Operand<F> {
    pub(crate) id: FnIdentity,
    pub(crate) f: F,
}

/// Wraps an erased function built from a user function of type `U`.
pub(crate) fn operand<U: 'static, T: ?Sized>(f: Arc<T>) -> Operand<Arc<T>> {
    Operand {
        id: FnIdentity::of::<U>(Arc::as_ptr(&f).cast::<()>()),
        f,
    }
}
