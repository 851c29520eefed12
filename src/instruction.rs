//! Erased instruction tree
//!
//! Public combinators compile down to the nine primitive instructions in this
//! module. Payloads are type-erased so the interpreter can run one loop for
//! every choice of the five channel types: plain values travel as
//! `Box<dyn Any>`, while the state and environment slots use `Rc<dyn Any>` so
//! a recovery boundary can snapshot them without cloning the underlying data.
//! The typed [`Effect`](crate::Effect) wrapper erases on construction and
//! downcasts at the run boundary; each pairing is local to one constructor,
//! which is what keeps the downcasts safe.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::rc::Rc;

use crate::cause::Cause;

/// Dynamically scoped interpreter flags, pushed for the duration of a
/// [`Instr::Flag`] child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuntimeFlag {
    /// Discard log entries recorded inside a scope that exits with a failure.
    ClearLogOnError,
}

/// An erased value travelling through the value channel (or a log entry).
pub(crate) type Payload = Box<dyn Any>;
/// An erased state or environment slot. Reference-counted so boundary frames
/// can snapshot it cheaply.
pub(crate) type Slot = Rc<dyn Any>;
/// A cause whose leaves are erased errors.
pub(crate) type ErasedCause = Cause<Payload>;

/// Continuation applied to a success value.
pub(crate) type SuccessFn = Box<dyn FnOnce(Payload) -> Instr>;
/// Recovery handler applied to a failure cause.
pub(crate) type FailureFn = Box<dyn FnOnce(ErasedCause) -> Instr>;
/// Reader of the innermost provided environment.
pub(crate) type AccessFn = Box<dyn FnOnce(&dyn Any) -> Instr>;
/// Atomic state transition producing the next state and a value.
pub(crate) type ModifyFn = Box<dyn FnOnce(Slot) -> (Slot, Payload)>;

/// The primitive instruction set.
///
/// The interpreter dispatches on the variant; every user-facing combinator is
/// sugar over these nine.
pub(crate) enum Instr {
    /// Run the child, then feed its success value to the continuation.
    FlatMap(Box<Instr>, SuccessFn),
    /// Produce a value, leaving state untouched.
    Succeed(Payload),
    /// Produce a failure cause, leaving state untouched.
    Fail(ErasedCause),
    /// Run the child under a recovery boundary; exactly one handler runs.
    Fold(Box<Instr>, FailureFn, SuccessFn),
    /// Read the current environment and continue with the produced tree.
    Access(AccessFn),
    /// Install an environment for the child's duration.
    Provide(Slot, Box<Instr>),
    /// Atomic state transition.
    Modify(ModifyFn),
    /// Append one log entry.
    Log(Payload),
    /// Push a dynamically scoped flag for the child's duration.
    Flag(RuntimeFlag, bool, Box<Instr>),
}

impl Instr {
    /// Variant name, used for diagnostics only.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Instr::FlatMap(..) => "FlatMap",
            Instr::Succeed(..) => "Succeed",
            Instr::Fail(..) => "Fail",
            Instr::Fold(..) => "Fold",
            Instr::Access(..) => "Access",
            Instr::Provide(..) => "Provide",
            Instr::Modify(..) => "Modify",
            Instr::Log(..) => "Log",
            Instr::Flag(..) => "Flag",
        }
    }
}

/// Erase a typed value into a payload.
pub(crate) fn erase<T: 'static>(value: T) -> Payload {
    Box::new(value)
}

/// Recover a typed value from a payload produced by the matching `erase`.
pub(crate) fn unerase<T: 'static>(payload: Payload) -> T {
    *payload
        .downcast()
        .expect("payload carries the type recorded at construction")
}

/// Erase every leaf of a typed cause.
pub(crate) fn erase_cause<E: 'static>(cause: Cause<E>) -> ErasedCause {
    cause.map(erase)
}

/// Recover a typed cause from an erased one.
pub(crate) fn unerase_cause<E: 'static>(cause: ErasedCause) -> Cause<E> {
    cause.map(unerase::<E>)
}

/// Move a typed value into a shared slot.
pub(crate) fn share<T: 'static>(value: T) -> Slot {
    Rc::new(value)
}

/// Take a typed value back out of a shared slot, cloning only when the slot
/// is still referenced by a boundary snapshot.
pub(crate) fn unshare<T: Clone + 'static>(slot: Slot) -> T {
    let rc = slot
        .downcast::<T>()
        .expect("slot carries the type recorded at construction");
    Rc::try_unwrap(rc).unwrap_or_else(|shared| (*shared).clone())
}
