//! Spool – a purely functional, stack-safe effect interpreter
//!
//! This crate evaluates immutable descriptions of computations that thread
//! five channels at once:
//! - An append-only log `W`, ordered by execution
//! - A state `S` carried from instruction to instruction
//! - A read-only environment `R` with lexically scoped overrides
//! - A structured error channel `E` with cause accumulation
//! - A success value `A`
//!
//! Descriptions compile to a nine-instruction tree; an explicit-stack machine
//! folds the tree into `(log, failure | (state, value))` without consuming
//! host stack, however deeply the sequencing nests. Failures carry a
//! [`Cause`] tree rather than a single error, recovery boundaries delimit
//! log-retention scopes, and a dynamically scoped flag decides whether a
//! failing scope keeps its log.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Structured failure values: cause trees and panic defects.
pub mod cause;
/// Typed effect descriptions, combinators, and the run facade.
pub mod effect;
/// Non-empty error lists for the validation run variant.
pub mod validation;

mod instruction;
mod runtime;

pub use cause::{Cause, Defect};
pub use effect::{Effect, Fallible, Reader, State, Writer};
pub use instruction::RuntimeFlag;
pub use validation::NonEmpty;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
