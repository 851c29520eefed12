//! Stack machine that folds an instruction tree into a run outcome
//!
//! The machine replaces host recursion with four explicit stacks:
//!
//! - continuations awaiting a success value (plain continuations and boundary
//!   frames share the stack but stay distinguishable, because the error
//!   unwind must find the nearest boundary without running anything else),
//! - environments installed by `Provide`,
//! - log builders, one per open recovery scope plus the root builder,
//! - booleans for the `ClearLogOnError` flag.
//!
//! Sequencing over a `Succeed` or `Modify` child is fused: the continuation
//! runs inline and the continuation stack does not grow. That fusion is what
//! keeps tight `flat_map`/`modify` loops allocation-flat.
//!
//! Scope bookkeeping for `Fold`, `Provide`, and `Flag` all rides the same
//! boundary-frame mechanism, so each scope's pops happen exactly once whether
//! its child succeeds or fails, and each participates in the log-retention
//! policy: a scope's log is committed to its parent on success, and on
//! failure it is committed unless `ClearLogOnError` is set.

use std::any::Any;
use std::mem;
use std::rc::Rc;

use crate::instruction::{ErasedCause, FailureFn, Instr, Payload, Slot, SuccessFn};

/// Entry on the continuation stack.
enum Cont {
    /// Plain continuation pushed by sequencing. Skipped silently during an
    /// error unwind; it owns no scope bookkeeping.
    Apply(SuccessFn),
    /// Scope boundary. The unwind stops here to resolve the scope.
    Boundary(Frame),
}

/// Bookkeeping for one open scope.
struct Frame {
    /// State observed when the scope was entered; restored on the failure
    /// exit only. The success exit keeps the child's output state.
    saved_state: Slot,
    kind: FrameKind,
}

enum FrameKind {
    /// User recovery handlers from a `Fold`.
    Fold {
        on_failure: FailureFn,
        on_success: SuccessFn,
    },
    /// Uninstalls the environment pushed by a `Provide`.
    PopEnv,
    /// Uninstalls the flag pushed by a `Flag`. On a failing exit with the
    /// flag set, the enclosing log builder is cleared as well.
    PopFlag,
}

/// Terminal result of a run, still type-erased.
pub(crate) enum Exit {
    /// The tree produced a value; the final state is the threaded one.
    Success { state: Slot, value: Payload },
    /// No boundary recovered the failure.
    Failure(ErasedCause),
}

/// Run an instruction tree to completion.
///
/// `state` seeds the state slot and `env` seeds the environment stack, so an
/// `Access` outside any `Provide` reads the value the run facade supplied.
pub(crate) fn evaluate(root: Instr, state: Slot, env: Slot) -> (Vec<Payload>, Exit) {
    Machine::new(state, env).run(root)
}

struct Machine {
    state: Slot,
    conts: Vec<Cont>,
    envs: Vec<Slot>,
    logs: Vec<Vec<Payload>>,
    flags: Vec<bool>,
}

impl Machine {
    fn new(state: Slot, env: Slot) -> Self {
        Machine {
            state,
            conts: Vec::new(),
            envs: vec![env],
            // The bottom builder accumulates the final log and is never
            // popped until the run finishes.
            logs: vec![Vec::new()],
            flags: vec![],
        }
    }

    fn run(mut self, root: Instr) -> (Vec<Payload>, Exit) {
        let mut current = root;
        loop {
            current = match current {
                Instr::FlatMap(child, k) => match *child {
                    Instr::Succeed(value) => k(value),
                    Instr::Modify(f) => k(self.apply_modify(f)),
                    child => {
                        self.conts.push(Cont::Apply(k));
                        child
                    }
                },
                Instr::Succeed(value) => match self.continue_with(value) {
                    Ok(next) => next,
                    Err(exit) => return self.finish(exit),
                },
                Instr::Fail(cause) => match self.unwind(cause) {
                    Ok(next) => next,
                    Err(exit) => return self.finish(exit),
                },
                Instr::Fold(child, on_failure, on_success) => {
                    self.open_scope(FrameKind::Fold {
                        on_failure,
                        on_success,
                    });
                    *child
                }
                Instr::Access(f) => f(self.environment()),
                Instr::Provide(env, child) => {
                    self.envs.push(env);
                    self.open_scope(FrameKind::PopEnv);
                    *child
                }
                Instr::Modify(f) => {
                    let value = self.apply_modify(f);
                    match self.continue_with(value) {
                        Ok(next) => next,
                        Err(exit) => return self.finish(exit),
                    }
                }
                Instr::Log(entry) => {
                    self.top_log().push(entry);
                    match self.continue_with(Box::new(())) {
                        Ok(next) => next,
                        Err(exit) => return self.finish(exit),
                    }
                }
                Instr::Flag(_, enabled, child) => {
                    self.flags.push(enabled);
                    self.open_scope(FrameKind::PopFlag);
                    *child
                }
            };
        }
    }

    /// Feed a success value to the stack, resolving boundary frames along the
    /// way, until a continuation yields the next instruction or the stack is
    /// exhausted.
    fn continue_with(&mut self, value: Payload) -> Result<Instr, Exit> {
        loop {
            match self.conts.pop() {
                None => {
                    return Err(Exit::Success {
                        state: Rc::clone(&self.state),
                        value,
                    })
                }
                Some(Cont::Apply(k)) => return Ok(k(value)),
                Some(Cont::Boundary(frame)) => {
                    // A succeeding scope always commits its log and keeps the
                    // child's output state.
                    self.close_scope_log(false);
                    match frame.kind {
                        FrameKind::Fold { on_success, .. } => return Ok(on_success(value)),
                        FrameKind::PopEnv => {
                            self.envs.pop();
                        }
                        FrameKind::PopFlag => {
                            self.flags.pop();
                        }
                    }
                }
            }
        }
    }

    /// Pop the stack looking for the nearest boundary able to recover.
    /// Plain continuations are discarded; builtin scopes run their exit
    /// bookkeeping and the unwind keeps going.
    fn unwind(&mut self, cause: ErasedCause) -> Result<Instr, Exit> {
        loop {
            match self.conts.pop() {
                None => {
                    tracing::trace!(errors = cause.len(), "failure left the run unhandled");
                    return Err(Exit::Failure(cause));
                }
                Some(Cont::Apply(_)) => {}
                Some(Cont::Boundary(frame)) => {
                    self.close_scope_log(true);
                    self.state = frame.saved_state;
                    match frame.kind {
                        FrameKind::Fold { on_failure, .. } => {
                            tracing::trace!("failure reached a recovery boundary");
                            return Ok(on_failure(cause));
                        }
                        FrameKind::PopEnv => {
                            self.envs.pop();
                        }
                        FrameKind::PopFlag => {
                            let enabled = self.flags.pop().unwrap_or(false);
                            if enabled {
                                self.top_log().clear();
                            }
                        }
                    }
                }
            }
        }
    }

    fn open_scope(&mut self, kind: FrameKind) {
        self.logs.push(Vec::new());
        self.conts.push(Cont::Boundary(Frame {
            saved_state: Rc::clone(&self.state),
            kind,
        }));
    }

    /// Pop the scope's log builder and merge it into the parent. On the
    /// failure path the scope's entries are dropped when `ClearLogOnError`
    /// is active; this is the only place log entries are discarded.
    fn close_scope_log(&mut self, failed: bool) {
        let scope = self.logs.pop().expect("every open scope pushed a builder");
        if failed && self.clear_log_on_error() {
            return;
        }
        self.top_log().extend(scope);
    }

    fn clear_log_on_error(&self) -> bool {
        self.flags.last().copied().unwrap_or(false)
    }

    fn top_log(&mut self) -> &mut Vec<Payload> {
        self.logs.last_mut().expect("the root builder is never popped")
    }

    fn environment(&self) -> &dyn Any {
        &**self
            .envs
            .last()
            .expect("the run facade seeds the environment stack")
    }

    fn apply_modify(&mut self, f: impl FnOnce(Slot) -> (Slot, Payload)) -> Payload {
        let previous = mem::replace(&mut self.state, Rc::new(()));
        let (next, value) = f(previous);
        self.state = next;
        value
    }

    fn finish(mut self, exit: Exit) -> (Vec<Payload>, Exit) {
        let log = self.logs.pop().expect("the root builder is never popped");
        debug_assert!(self.logs.is_empty(), "scope builders outlived their scopes");
        debug_assert!(self.conts.is_empty(), "continuations outlived the run");
        debug_assert!(self.flags.is_empty(), "flag scopes outlived the run");
        debug_assert_eq!(self.envs.len(), 1, "provided environments outlived their scopes");
        (log, exit)
    }
}
