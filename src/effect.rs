//! Typed effect descriptions and the run facade
//!
//! An [`Effect`] is an immutable description of a computation threading five
//! channels: an append-only log `W`, a state `S`, a read-only environment
//! `R`, an error `E`, and a success value `A`. Nothing happens until one of
//! the `run` methods hands the underlying instruction tree to the
//! interpreter in [`runtime`](crate::runtime).
//!
//! Constructors erase their payloads into the instruction tree; the run
//! facade downcasts them back. Every combinator here is sugar over the nine
//! primitives; none of them can observe the interpreter's stacks.
//!
//! Descriptions are one-shot: running consumes the tree, so a value used
//! twice must be rebuilt (or produced by a thunk, as the repetition
//! combinators do). This is also what guarantees no instruction is ever
//! re-executed within a run.

use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::cause::{Cause, Defect};
use crate::instruction::{
    erase, erase_cause, share, unerase, unerase_cause, unshare, Instr, RuntimeFlag,
};
use crate::runtime::{self, Exit};
use crate::validation::NonEmpty;

/// An immutable description of a computation with log, state, environment,
/// error, and value channels.
pub struct Effect<W, S, R, E, A> {
    instr: Instr,
    _channels: PhantomData<fn(S, R) -> (W, S, E, A)>,
}

impl<W, S, R, E, A> fmt::Debug for Effect<W, S, R, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Effect").field(&self.instr.describe()).finish()
    }
}

impl<W, S, R, E, A> Effect<W, S, R, E, A>
where
    W: 'static,
    S: 'static,
    R: 'static,
    E: 'static,
    A: 'static,
{
    fn from_instr(instr: Instr) -> Self {
        Effect {
            instr,
            _channels: PhantomData,
        }
    }

    // ---- constructors ----------------------------------------------------

    /// Produce `value`, leaving state and log untouched.
    pub fn succeed(value: A) -> Self {
        Self::from_instr(Instr::Succeed(erase(value)))
    }

    /// Fail with a single error.
    pub fn fail(error: E) -> Self {
        Self::from_instr(Instr::Fail(Cause::single(erase(error))))
    }

    /// Fail with the given cause verbatim.
    pub fn halt(cause: Cause<E>) -> Self {
        Self::from_instr(Instr::Fail(erase_cause(cause)))
    }

    /// Atomic state transition producing a value. Infallible.
    pub fn modify(f: impl FnOnce(S) -> (S, A) + 'static) -> Self
    where
        S: Clone,
    {
        Self::from_instr(Instr::Modify(Box::new(move |slot| {
            let (next, value) = f(unshare::<S>(slot));
            (share(next), erase(value))
        })))
    }

    /// Read the innermost provided environment.
    pub fn access(f: impl FnOnce(&R) -> A + 'static) -> Self {
        Self::from_instr(Instr::Access(Box::new(move |env| {
            Instr::Succeed(erase(f(expect_env::<R>(env))))
        })))
    }

    /// Read the environment and continue with the effect it selects.
    pub fn access_with(f: impl FnOnce(&R) -> Self + 'static) -> Self {
        Self::from_instr(Instr::Access(Box::new(move |env| {
            f(expect_env::<R>(env)).instr
        })))
    }

    /// Defer construction of an effect until the interpreter reaches it.
    pub fn suspend(thunk: impl FnOnce() -> Self + 'static) -> Self {
        Self::from_instr(Instr::FlatMap(
            Box::new(Instr::Succeed(erase(()))),
            Box::new(move |_| thunk().instr),
        ))
    }

    /// Lift a `Result` into an effect.
    pub fn from_result(result: Result<A, E>) -> Self {
        match result {
            Ok(value) => Self::succeed(value),
            Err(error) => Self::fail(error),
        }
    }

    /// Lift an `Option`, failing with `or_else` when it is `None`.
    pub fn from_option(option: Option<A>, or_else: impl FnOnce() -> E) -> Self {
        match option {
            Some(value) => Self::succeed(value),
            None => Self::fail(or_else()),
        }
    }

    // ---- sequencing ------------------------------------------------------

    /// Run `self`, then feed its value to `k`.
    pub fn flat_map<B: 'static>(
        self,
        k: impl FnOnce(A) -> Effect<W, S, R, E, B> + 'static,
    ) -> Effect<W, S, R, E, B> {
        Effect::from_instr(Instr::FlatMap(
            Box::new(self.instr),
            Box::new(move |value| k(unerase::<A>(value)).instr),
        ))
    }

    /// Transform the success value.
    pub fn map<B: 'static>(self, f: impl FnOnce(A) -> B + 'static) -> Effect<W, S, R, E, B> {
        self.flat_map(|value| Effect::succeed(f(value)))
    }

    /// Run both effects in order, combining their values.
    pub fn zip_with<B: 'static, C: 'static>(
        self,
        that: Effect<W, S, R, E, B>,
        f: impl FnOnce(A, B) -> C + 'static,
    ) -> Effect<W, S, R, E, C> {
        self.flat_map(move |a| that.map(move |b| f(a, b)))
    }

    /// Run both effects in order, keeping both values.
    pub fn zip<B: 'static>(self, that: Effect<W, S, R, E, B>) -> Effect<W, S, R, E, (A, B)> {
        self.zip_with(that, |a, b| (a, b))
    }

    /// Run both effects in order, keeping the first value.
    pub fn zip_left<B: 'static>(self, that: Effect<W, S, R, E, B>) -> Effect<W, S, R, E, A> {
        self.zip_with(that, |a, _| a)
    }

    /// Run both effects in order, keeping the second value.
    pub fn zip_right<B: 'static>(self, that: Effect<W, S, R, E, B>) -> Effect<W, S, R, E, B> {
        self.flat_map(move |_| that)
    }

    /// Run an inspection effect on the value, then restore it.
    pub fn tap<B: 'static>(
        self,
        f: impl FnOnce(&A) -> Effect<W, S, R, E, B> + 'static,
    ) -> Effect<W, S, R, E, A> {
        self.flat_map(|value| {
            let probe = f(&value);
            probe.map(move |_| value)
        })
    }

    // ---- recovery --------------------------------------------------------

    /// Unified recovery: run `self` under a boundary and hand the outcome to
    /// exactly one of the two handlers. This is the only way to intercept a
    /// failure, and it delimits a log-retention scope.
    pub fn fold_cause<E2: 'static, B: 'static>(
        self,
        failure: impl FnOnce(Cause<E>) -> Effect<W, S, R, E2, B> + 'static,
        success: impl FnOnce(A) -> Effect<W, S, R, E2, B> + 'static,
    ) -> Effect<W, S, R, E2, B> {
        Effect::from_instr(Instr::Fold(
            Box::new(self.instr),
            Box::new(move |cause| failure(unerase_cause::<E>(cause)).instr),
            Box::new(move |value| success(unerase::<A>(value)).instr),
        ))
    }

    /// Fold both outcomes into a plain value; the result cannot fail.
    pub fn fold<B: 'static>(
        self,
        failure: impl FnOnce(E) -> B + 'static,
        success: impl FnOnce(A) -> B + 'static,
    ) -> Effect<W, S, R, Infallible, B> {
        self.fold_cause(
            |cause| Effect::succeed(failure(cause.into_first())),
            |value| Effect::succeed(success(value)),
        )
    }

    /// Recover from a failure using its first error.
    pub fn catch_all<E2: 'static>(
        self,
        recover: impl FnOnce(E) -> Effect<W, S, R, E2, A> + 'static,
    ) -> Effect<W, S, R, E2, A> {
        self.fold_cause(move |cause| recover(cause.into_first()), Effect::succeed)
    }

    /// Recover from a failure with the full cause.
    pub fn catch_all_cause<E2: 'static>(
        self,
        recover: impl FnOnce(Cause<E>) -> Effect<W, S, R, E2, A> + 'static,
    ) -> Effect<W, S, R, E2, A> {
        self.fold_cause(recover, Effect::succeed)
    }

    /// Fall back to another effect when `self` fails.
    pub fn or_else<E2: 'static>(
        self,
        fallback: impl FnOnce() -> Effect<W, S, R, E2, A> + 'static,
    ) -> Effect<W, S, R, E2, A> {
        self.catch_all(move |_| fallback())
    }

    /// Transform every error in the cause, preserving its shape.
    pub fn map_error<E2: 'static>(
        self,
        f: impl FnMut(E) -> E2 + 'static,
    ) -> Effect<W, S, R, E2, A> {
        self.fold_cause(move |cause| Effect::halt(cause.map(f)), Effect::succeed)
    }

    /// Transform the error and value channels at once.
    pub fn map_both<E2: 'static, B: 'static>(
        self,
        on_error: impl FnMut(E) -> E2 + 'static,
        on_value: impl FnOnce(A) -> B + 'static,
    ) -> Effect<W, S, R, E2, B> {
        self.fold_cause(
            move |cause| Effect::halt(cause.map(on_error)),
            |value| Effect::succeed(on_value(value)),
        )
    }

    /// Run an inspection effect on the first error, then re-raise the
    /// original cause unchanged.
    pub fn tap_error<B: 'static>(
        self,
        f: impl FnOnce(&E) -> Effect<W, S, R, E, B> + 'static,
    ) -> Effect<W, S, R, E, A> {
        self.fold_cause(
            move |cause| {
                let probe = f(cause.first());
                probe.flat_map(move |_| Effect::halt(cause))
            },
            Effect::succeed,
        )
    }

    /// Surface the outcome as a value; the result cannot fail.
    pub fn either(self) -> Effect<W, S, R, Infallible, Result<A, E>> {
        self.fold_cause(
            |cause| Effect::succeed(Err(cause.into_first())),
            |value| Effect::succeed(Ok(value)),
        )
    }

    /// Narrow the error type with a partial refinement. Errors the
    /// refinement rejects become panics and escape the run.
    pub fn refine_or_die<E2: 'static>(
        self,
        mut refine: impl FnMut(E) -> Result<E2, E> + 'static,
    ) -> Effect<W, S, R, E2, A>
    where
        E: fmt::Debug,
    {
        self.fold_cause(
            move |cause| {
                Effect::halt(cause.map(|error| match refine(error) {
                    Ok(refined) => refined,
                    Err(unrefined) => panic!("unrefined failure escaped: {:?}", unrefined),
                }))
            },
            Effect::succeed,
        )
    }

    // ---- accumulation ----------------------------------------------------

    /// Run both effects even if the first fails, combining values on double
    /// success and accumulating causes with [`Cause::Both`] on double
    /// failure.
    pub fn zip_with_par<B: 'static, C: 'static>(
        self,
        that: Effect<W, S, R, E, B>,
        combine: impl FnOnce(A, B) -> C + 'static,
    ) -> Effect<W, S, R, E, C> {
        let left = self.fold_cause(
            |cause| Effect::succeed(Err(cause)),
            |value| Effect::succeed(Ok(value)),
        );
        let right = that.fold_cause(
            |cause| Effect::succeed(Err(cause)),
            |value| Effect::succeed(Ok(value)),
        );
        left.flat_map(move |first| {
            right.flat_map(move |second| match (first, second) {
                (Ok(a), Ok(b)) => Effect::succeed(combine(a, b)),
                (Err(first), Err(second)) => Effect::halt(Cause::both(first, second)),
                (Err(cause), Ok(_)) | (Ok(_), Err(cause)) => Effect::halt(cause),
            })
        })
    }

    /// Accumulating variant of [`Effect::zip`].
    pub fn zip_par<B: 'static>(self, that: Effect<W, S, R, E, B>) -> Effect<W, S, R, E, (A, B)> {
        self.zip_with_par(that, |a, b| (a, b))
    }

    // ---- environment and flags -------------------------------------------

    /// Install `environment` for the duration of `self`. The result no
    /// longer needs an environment of type `R`.
    pub fn provide<R2: 'static>(self, environment: R) -> Effect<W, S, R2, E, A> {
        Effect::from_instr(Instr::Provide(share(environment), Box::new(self.instr)))
    }

    /// Discard this scope's log entries if it exits with a failure.
    pub fn clear_log_on_error(self) -> Self {
        Self::from_instr(Instr::Flag(
            RuntimeFlag::ClearLogOnError,
            true,
            Box::new(self.instr),
        ))
    }

    /// Keep this scope's log entries even if it exits with a failure,
    /// overriding an enclosing [`Effect::clear_log_on_error`].
    pub fn keep_log_on_error(self) -> Self {
        Self::from_instr(Instr::Flag(
            RuntimeFlag::ClearLogOnError,
            false,
            Box::new(self.instr),
        ))
    }

    // ---- collections and repetition --------------------------------------

    /// Run every effect in order, collecting the values. Fails fast on the
    /// first failure.
    pub fn collect_all(effects: impl IntoIterator<Item = Self>) -> Effect<W, S, R, E, Vec<A>> {
        effects
            .into_iter()
            .fold(Effect::succeed(Vec::new()), |acc, effect| {
                acc.zip_with(effect, |mut values, value| {
                    values.push(value);
                    values
                })
            })
    }

    /// Build one effect per item and run them in order, collecting values.
    pub fn for_each<I: IntoIterator>(
        items: I,
        mut f: impl FnMut(I::Item) -> Self,
    ) -> Effect<W, S, R, E, Vec<A>> {
        Self::collect_all(items.into_iter().map(move |item| f(item)))
    }

    /// Run the effect produced by `body` `times` times, collecting values.
    pub fn repeat_n(
        times: usize,
        mut body: impl FnMut() -> Self,
    ) -> Effect<W, S, R, E, Vec<A>> {
        Self::for_each(0..times, move |_| body())
    }

    /// Thread a value through `step` while `cont` holds, returning the first
    /// value that fails the predicate. Stack-safe for any iteration count.
    pub fn iterate(
        initial: A,
        cont: impl Fn(&A) -> bool + 'static,
        step: impl Fn(A) -> Self + 'static,
    ) -> Self {
        Self::iterate_loop(initial, Rc::new(cont), Rc::new(step))
    }

    fn iterate_loop(
        value: A,
        cont: Rc<dyn Fn(&A) -> bool>,
        step: Rc<dyn Fn(A) -> Self>,
    ) -> Self {
        if cont(&value) {
            let next = step(value);
            next.flat_map(move |value| Self::iterate_loop(value, cont, step))
        } else {
            Effect::succeed(value)
        }
    }
}

fn expect_env<R: 'static>(env: &dyn Any) -> &R {
    env.downcast_ref::<R>()
        .expect("environment slot carries the provided type")
}

// ---- value-channel specializations ---------------------------------------

impl<W, S, R, E> Effect<W, S, R, E, ()>
where
    W: 'static,
    S: 'static,
    R: 'static,
    E: 'static,
{
    /// The no-op effect.
    pub fn unit() -> Self {
        Self::succeed(())
    }

    /// Append one log entry.
    pub fn log(entry: W) -> Self {
        Self::from_instr(Instr::Log(erase(entry)))
    }

    /// Replace the state.
    pub fn set(state: S) -> Self
    where
        S: Clone,
    {
        Self::modify(move |_| (state, ()))
    }

    /// Transform the state.
    pub fn update(f: impl FnOnce(S) -> S + 'static) -> Self
    where
        S: Clone,
    {
        Self::modify(move |state| (f(state), ()))
    }

    /// Run the effect built by `thunk` only when `condition` holds.
    pub fn when(condition: bool, thunk: impl FnOnce() -> Self + 'static) -> Self {
        if condition {
            Self::suspend(thunk)
        } else {
            Self::unit()
        }
    }
}

impl<W, S, R, E> Effect<W, S, R, E, S>
where
    W: 'static,
    S: Clone + 'static,
    R: 'static,
    E: 'static,
{
    /// Read the current state.
    pub fn get() -> Self {
        Self::modify(|state: S| (state.clone(), state))
    }
}

impl<W, S, R, E> Effect<W, S, R, E, R>
where
    W: 'static,
    S: 'static,
    R: Clone + 'static,
    E: 'static,
{
    /// Read the whole environment.
    pub fn environment() -> Self {
        Self::access(|env: &R| env.clone())
    }
}

impl<W, S, R, A> Effect<W, S, R, Defect, A>
where
    W: 'static,
    S: 'static,
    R: 'static,
    A: 'static,
{
    /// Run a host function, converting an unwinding panic into a [`Defect`]
    /// failure. Aborting conditions are not interceptable and still
    /// terminate the process.
    pub fn attempt(f: impl FnOnce() -> A + 'static) -> Self {
        Self::suspend(move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Effect::succeed(value),
            Err(payload) => Effect::fail(Defect::from_panic(payload)),
        })
    }
}

// ---- run facade -----------------------------------------------------------

impl<W, S, E, A> Effect<W, S, (), E, A>
where
    W: 'static,
    S: Clone + 'static,
    E: 'static,
    A: 'static,
{
    /// Run the interpreter, returning the full `(log, outcome)` pair.
    pub fn run_all(self, initial: S) -> (Vec<W>, Result<(S, A), Cause<E>>) {
        let (log, exit) = runtime::evaluate(self.instr, share(initial), share(()));
        let log: Vec<W> = log.into_iter().map(unerase::<W>).collect();
        let result = match exit {
            Exit::Success { state, value } => Ok((unshare::<S>(state), unerase::<A>(value))),
            Exit::Failure(cause) => Err(unerase_cause::<E>(cause)),
        };
        tracing::debug!(
            log_entries = log.len(),
            failed = result.is_err(),
            "effect run finished"
        );
        (log, result)
    }

    /// Run, projecting a failure to its first error.
    pub fn run_result(self, initial: S) -> Result<A, E> {
        match self.run_all(initial).1 {
            Ok((_, value)) => Ok(value),
            Err(cause) => Err(cause.into_first()),
        }
    }

    /// Run, projecting a failure to the full non-empty error list.
    pub fn run_validation(self, initial: S) -> (Vec<W>, Result<A, NonEmpty<E>>) {
        let (log, result) = self.run_all(initial);
        let result = match result {
            Ok((_, value)) => Ok(value),
            Err(cause) => Err(NonEmpty::from(cause)),
        };
        (log, result)
    }
}

impl<W, S, A> Effect<W, S, (), Infallible, A>
where
    W: 'static,
    S: Clone + 'static,
    A: 'static,
{
    /// Run an infallible effect, returning the final state and value.
    pub fn run_state(self, initial: S) -> (S, A) {
        match self.run_all(initial).1 {
            Ok(pair) => pair,
            Err(cause) => match cause.into_first() {},
        }
    }

    /// Run an infallible effect, returning the log and value.
    pub fn run_log(self, initial: S) -> (Vec<W>, A) {
        let (log, result) = self.run_all(initial);
        match result {
            Ok((_, value)) => (log, value),
            Err(cause) => match cause.into_first() {},
        }
    }
}

impl<W, A> Effect<W, (), (), Infallible, A>
where
    W: 'static,
    A: 'static,
{
    /// Run a stateless, infallible effect for its value alone.
    pub fn run(self) -> A {
        self.run_state(()).1
    }
}

// ---- channel-pinning aliases ----------------------------------------------

/// Effect that only threads state.
pub type State<S, A> = Effect<Infallible, S, (), Infallible, A>;

/// Effect that only reads an environment.
pub type Reader<R, A> = Effect<Infallible, (), R, Infallible, A>;

/// Effect that only appends to a log.
pub type Writer<W, A> = Effect<W, (), (), Infallible, A>;

/// Effect that only carries an error channel.
pub type Fallible<E, A> = Effect<Infallible, (), (), E, A>;

#[cfg(test)]
mod tests {
    use super::*;

    type Eff<A> = Effect<String, i32, (), String, A>;

    #[test]
    fn map_transforms_the_value() {
        let effect = Eff::succeed(20).map(|n| n + 1);
        assert_eq!(effect.run_result(0), Ok(21));
    }

    #[test]
    fn access_with_branches_on_the_environment() {
        let double_small = || {
            Effect::<String, i32, i32, String, i32>::access_with(|r: &i32| {
                if *r < 10 {
                    Effect::succeed(r * 2)
                } else {
                    Effect::fail(format!("{} is too large", r))
                }
            })
        };
        assert_eq!(double_small().provide(4).run_result(0), Ok(8));
        assert_eq!(
            double_small().provide(12).run_result(0),
            Err("12 is too large".to_string())
        );
    }

    #[test]
    fn from_result_lifts_both_arms() {
        assert_eq!(Eff::from_result(Ok(5)).run_result(0), Ok(5));
        assert_eq!(
            Eff::<i32>::from_result(Err("bad".to_string())).run_result(0),
            Err("bad".to_string())
        );
    }

    #[test]
    fn from_option_fails_only_when_empty() {
        let effect = Eff::from_option(Some(5), || "missing".to_string());
        assert_eq!(effect.run_result(0), Ok(5));

        let effect = Eff::<i32>::from_option(None, || "missing".to_string());
        assert_eq!(effect.run_result(0), Err("missing".to_string()));
    }

    #[test]
    fn state_helpers_are_one_modify() {
        let effect = Eff::set(5)
            .zip_right(Eff::update(|s| s * 3))
            .zip_right(Eff::get());
        assert_eq!(effect.run_all(0).1, Ok((15, 15)));
    }

    #[test]
    fn catch_all_sees_the_first_error() {
        let effect = Eff::<i32>::halt(Cause::then(
            Cause::single("first".to_string()),
            Cause::single("second".to_string()),
        ))
        .catch_all(|error| Eff::succeed(error.len() as i32));
        assert_eq!(effect.run_result(0), Ok(5));
    }

    #[test]
    fn or_else_replaces_a_failure() {
        let effect = Eff::<i32>::fail("nope".into()).or_else(|| Eff::succeed(3));
        assert_eq!(effect.run_result(0), Ok(3));
    }

    #[test]
    fn fold_collapses_both_outcomes_infallibly() {
        let succeeded: Eff<i32> = Eff::succeed(3);
        let (_, result) = succeeded.fold(|_| -1, |v| v + 1).run_all(0);
        assert_eq!(result, Ok((0, 4)));

        let failed: Eff<i32> = Eff::fail("bad".into());
        let (_, result) = failed.fold(|error| error.len() as i32, |v| v + 1).run_all(0);
        assert_eq!(result, Ok((0, 3)));
    }

    #[test]
    fn catch_all_cause_receives_the_whole_tree() {
        let effect = Eff::<i32>::halt(Cause::then(
            Cause::single("first".to_string()),
            Cause::single("second".to_string()),
        ))
        .catch_all_cause(|cause| Eff::succeed(cause.len() as i32));
        assert_eq!(effect.run_result(0), Ok(2));
    }

    #[test]
    fn map_both_transforms_error_and_value_together() {
        let failed: Effect<String, i32, (), usize, i32> =
            Eff::<i32>::fail("abc".into()).map_both(|error| error.len(), |v| v + 1);
        assert_eq!(failed.run_result(0), Err(3));

        let succeeded: Effect<String, i32, (), usize, i32> =
            Eff::succeed(3).map_both(|error: String| error.len(), |v| v + 1);
        assert_eq!(succeeded.run_result(0), Ok(4));
    }

    #[test]
    fn tap_error_logs_and_reraises_the_original_cause() {
        let effect = Eff::<i32>::halt(Cause::then(
            Cause::single("first".to_string()),
            Cause::single("second".to_string()),
        ))
        .tap_error(|error| Eff::log(format!("saw {}", error)));
        let (log, result) = effect.run_all(0);
        assert_eq!(log, vec!["saw first".to_string()]);
        assert_eq!(
            result.unwrap_err(),
            Cause::then(
                Cause::single("first".to_string()),
                Cause::single("second".to_string())
            )
        );
    }

    #[test]
    fn tap_error_probe_failure_wins_over_the_original() {
        let effect = Eff::<i32>::fail("original".into())
            .tap_error(|_| Eff::<()>::fail("probe broke".into()));
        assert_eq!(effect.run_result(0), Err("probe broke".to_string()));
    }

    #[test]
    fn map_error_preserves_cause_shape() {
        let effect: Effect<String, i32, (), usize, i32> = Eff::<i32>::halt(Cause::both(
            Cause::single("ab".to_string()),
            Cause::single("cdef".to_string()),
        ))
        .map_error(|error| error.len());
        let (_, result) = effect.run_all(0);
        assert_eq!(
            result.unwrap_err(),
            Cause::both(Cause::single(2), Cause::single(4))
        );
    }

    #[test]
    fn tap_keeps_the_value_and_logs() {
        let effect = Eff::succeed(4).tap(|n| Eff::log(format!("saw {}", n)));
        let (log, result) = effect.run_all(0);
        assert_eq!(log, vec!["saw 4".to_string()]);
        assert_eq!(result, Ok((0, 4)));
    }

    #[test]
    fn zip_left_still_runs_the_discarded_side() {
        let effect = Eff::succeed(1).zip_left(Eff::log("second ran".to_string()).map(|_| 2));
        let (log, result) = effect.run_all(0);
        assert_eq!(log, vec!["second ran".to_string()]);
        assert_eq!(result, Ok((0, 1)));
    }

    #[test]
    fn collect_all_fails_fast() {
        let effects = vec![
            Eff::succeed(1),
            Eff::fail("stop".into()),
            Eff::log("unreachable".into()).map(|_| 3),
        ];
        let (log, result) = Eff::collect_all(effects).run_all(0);
        assert!(log.is_empty());
        assert_eq!(result.unwrap_err(), Cause::single("stop".to_string()));
    }

    #[test]
    fn for_each_collects_in_order() {
        let effect = Eff::for_each(1..=4, Eff::succeed);
        assert_eq!(effect.run_result(0), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn repeat_n_reruns_the_body() {
        let effect = Eff::repeat_n(3, || Eff::update(|s| s + 1).map(|_| ()));
        let (_, result) = effect.run_all(0);
        assert_eq!(result.map(|(state, _)| state), Ok(3));
    }

    #[test]
    fn when_skips_the_thunk() {
        let skipped = Eff::when(false, || Eff::log("no".into()));
        assert!(skipped.run_all(0).0.is_empty());

        let taken = Eff::when(true, || Eff::log("yes".into()));
        assert_eq!(taken.run_all(0).0, vec!["yes".to_string()]);
    }

    #[test]
    fn either_surfaces_the_outcome() {
        let failed: Effect<String, i32, (), String, i32> = Eff::fail("x".into());
        let (_, result) = failed.either().run_all(0);
        assert_eq!(result, Ok((0, Err("x".to_string()))));
    }

    #[test]
    fn debug_names_the_head_instruction() {
        let effect = Eff::succeed(1);
        assert_eq!(format!("{:?}", effect), "Effect(\"Succeed\")");
    }
}
