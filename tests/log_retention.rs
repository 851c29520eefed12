//! Log ordering and the retention policy around recovery boundaries.

use spool::{Cause, Effect};

type Eff<A> = Effect<String, i32, (), String, A>;

fn note(entry: &str) -> Eff<()> {
    Eff::log(entry.to_string())
}

#[test]
fn log_entries_arrive_in_execution_order() {
    let effect = note("one")
        .zip_right(Eff::modify(|s| (s + 1, ())))
        .zip_right(note("two"))
        .zip_right(Eff::succeed(()))
        .zip_right(note("three"));
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["one", "two", "three"]);
    assert_eq!(result, Ok((1, ())));
}

#[test]
fn success_fold_commits_the_scope_log() {
    let effect = note("a").zip_right(
        note("b")
            .zip_right(Eff::succeed(1))
            .fold_cause(|_| Eff::succeed(0), |v| Eff::succeed(v + 1)),
    );
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a", "b"]);
    assert_eq!(result, Ok((0, 2)));
}

#[test]
fn failing_scope_drops_its_log_when_clearing_is_on() {
    let effect = note("a").zip_right(
        note("b")
            .zip_right(Eff::<i32>::fail("x".into()))
            .clear_log_on_error()
            .fold_cause(|_| Eff::succeed(0), Eff::succeed),
    );
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a"]);
    assert_eq!(result, Ok((0, 0)));
}

#[test]
fn failing_scope_keeps_its_log_by_default() {
    let effect = note("a").zip_right(
        note("b")
            .zip_right(Eff::<i32>::fail("x".into()))
            .keep_log_on_error()
            .fold_cause(|_| Eff::succeed(0), Eff::succeed),
    );
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a", "b"]);
    assert_eq!(result, Ok((0, 0)));
}

#[test]
fn fold_success_commits_even_inside_a_clearing_scope() {
    let effect = note("a")
        .zip_right(
            note("b")
                .zip_right(Eff::succeed(1))
                .fold_cause(|_| Eff::succeed(0), Eff::succeed),
        )
        .clear_log_on_error();
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a", "b"]);
    assert_eq!(result, Ok((0, 1)));
}

#[test]
fn entries_committed_by_an_inner_fold_still_die_with_the_clearing_scope() {
    // The inner fold succeeds and commits "b" one level up, but the level it
    // commits into belongs to the clearing scope, which then fails.
    let inner = note("b")
        .zip_right(Eff::succeed(1))
        .fold_cause(|_| Eff::succeed(-1), Eff::succeed);
    let effect = note("a").zip_right(
        inner
            .zip_right(Eff::<i32>::fail("x".into()))
            .clear_log_on_error()
            .fold_cause(|_| Eff::succeed(0), Eff::succeed),
    );
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a"]);
    assert_eq!(result, Ok((0, 0)));
}

#[test]
fn keeping_inside_a_clearing_scope_does_not_resurrect_entries() {
    let effect = note("a").zip_right(
        note("b")
            .zip_right(Eff::<i32>::fail("x".into()))
            .keep_log_on_error()
            .clear_log_on_error()
            .fold_cause(|_| Eff::succeed(0), Eff::succeed),
    );
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a"]);
    assert_eq!(result, Ok((0, 0)));
}

#[test]
fn unhandled_failure_with_clearing_on_drops_the_whole_log() {
    let effect = note("a").zip_right(
        note("b")
            .zip_right(Eff::<i32>::fail("x".into()))
            .clear_log_on_error(),
    );
    let (log, result) = effect.run_all(0);
    assert!(log.is_empty());
    assert_eq!(result.unwrap_err(), Cause::single("x".to_string()));
}

#[test]
fn unhandled_failure_keeps_the_log_by_default() {
    let effect = note("a").zip_right(note("b").zip_right(Eff::<i32>::fail("x".into())));
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["a", "b"]);
    assert_eq!(result.unwrap_err(), Cause::single("x".to_string()));
}

#[test]
fn recovery_effects_log_into_the_enclosing_scope() {
    let effect = note("before").zip_right(
        Eff::<i32>::fail("x".into())
            .fold_cause(|_| note("rescued").map(|_| 0), Eff::succeed),
    );
    let (log, result) = effect.run_all(0);
    assert_eq!(log, vec!["before", "rescued"]);
    assert_eq!(result, Ok((0, 0)));
}
