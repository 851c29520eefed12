//! Structured failure values
//!
//! A failing run does not carry a single error: handlers can re-raise after
//! doing work, and the accumulating combinators run both sides before giving
//! up. [`Cause`] records that history as an immutable tree whose leaves are
//! the underlying errors. The tree shape is preserved inside the interpreter;
//! callers flatten it on demand with [`Cause::first`] or [`Cause::into_vec`].

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Tree of failure values accumulated during a run.
///
/// Leaves are single errors. `Then` is sequential composition (an error
/// raised after an earlier one was already in flight, e.g. a recovery handler
/// re-raising). `Both` is parallel composition, produced only by the
/// accumulating combinators (`zip_par` and friends). Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cause<E> {
    /// A single underlying error.
    Single(E),
    /// Sequential composition: `left` happened, then `right`.
    Then(Box<Cause<E>>, Box<Cause<E>>),
    /// Parallel composition: `left` and `right` were both observed.
    Both(Box<Cause<E>>, Box<Cause<E>>),
}

impl<E> Cause<E> {
    /// Wrap one error as a leaf cause.
    pub fn single(error: E) -> Self {
        Cause::Single(error)
    }

    /// Compose two causes sequentially.
    pub fn then(left: Cause<E>, right: Cause<E>) -> Self {
        Cause::Then(Box::new(left), Box::new(right))
    }

    /// Compose two causes in parallel.
    pub fn both(left: Cause<E>, right: Cause<E>) -> Self {
        Cause::Both(Box::new(left), Box::new(right))
    }

    /// The leftmost leaf in in-order traversal.
    pub fn first(&self) -> &E {
        let mut current = self;
        loop {
            match current {
                Cause::Single(error) => return error,
                Cause::Then(left, _) | Cause::Both(left, _) => current = left,
            }
        }
    }

    /// Consume the cause and return its leftmost leaf.
    pub fn into_first(self) -> E {
        let mut current = self;
        loop {
            match current {
                Cause::Single(error) => return error,
                Cause::Then(left, _) | Cause::Both(left, _) => current = *left,
            }
        }
    }

    /// Number of leaves in the tree. Always at least one.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(cause) = pending.pop() {
            match cause {
                Cause::Single(_) => count += 1,
                Cause::Then(left, right) | Cause::Both(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        count
    }

    /// A cause never holds zero errors.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// In-order leaf list, borrowing the errors.
    pub fn to_vec(&self) -> Vec<&E> {
        let mut leaves = Vec::new();
        let mut pending = vec![self];
        while let Some(cause) = pending.pop() {
            match cause {
                Cause::Single(error) => leaves.push(error),
                Cause::Then(left, right) | Cause::Both(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        leaves
    }

    /// In-order leaf list, consuming the tree.
    pub fn into_vec(self) -> Vec<E> {
        let mut leaves = Vec::new();
        let mut pending = vec![self];
        while let Some(cause) = pending.pop() {
            match cause {
                Cause::Single(error) => leaves.push(error),
                Cause::Then(left, right) | Cause::Both(left, right) => {
                    pending.push(*right);
                    pending.push(*left);
                }
            }
        }
        leaves
    }

    /// Transform every leaf, preserving the tree shape. Leaves are visited
    /// left to right.
    pub fn map<E2>(self, mut f: impl FnMut(E) -> E2) -> Cause<E2> {
        fn go<E, E2>(cause: Cause<E>, f: &mut impl FnMut(E) -> E2) -> Cause<E2> {
            match cause {
                Cause::Single(error) => Cause::Single(f(error)),
                Cause::Then(left, right) => {
                    let left = go(*left, f);
                    let right = go(*right, f);
                    Cause::then(left, right)
                }
                Cause::Both(left, right) => {
                    let left = go(*left, f);
                    let right = go(*right, f);
                    Cause::both(left, right)
                }
            }
        }
        go(self, &mut f)
    }
}

impl<E: fmt::Display> fmt::Display for Cause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Single(error) => write!(f, "{}", error),
            Cause::Then(left, right) => write!(f, "({}; then {})", left, right),
            Cause::Both(left, right) => write!(f, "({} & {})", left, right),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Cause<E> {}

/// Failure value produced when [`attempt`](crate::Effect::attempt) intercepts
/// a panic from a user function.
///
/// The original panic payload is retained so callers can re-raise it with
/// [`Defect::resume_unwind`]. Aborting conditions never unwind and therefore
/// never become a `Defect`.
#[derive(Error)]
#[error("user function panicked: {message}")]
pub struct Defect {
    message: String,
    payload: Box<dyn Any + Send>,
}

impl Defect {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Defect { message, payload }
    }

    /// Human-readable rendering of the panic payload.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Recover the raw panic payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }

    /// Re-raise the original panic.
    pub fn resume_unwind(self) -> ! {
        std::panic::resume_unwind(self.payload)
    }
}

impl fmt::Debug for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Defect")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
