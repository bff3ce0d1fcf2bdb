use std::sync::{Arc, Mutex};

use crate::config::RunOptions;
use crate::engine::{run, ChainOutcome, Completion};
use crate::steps::{FilterStep, ThenStage};

/// End-to-end scenarios for the chain executor, covering the full behavior
/// matrix: ordering, halting, interposed callbacks, error capture and
/// delivery, scope identity, payload passthrough, and finishing stages.
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Step = FilterStep<(), String, &'static str>;
    type Recorded = Arc<Mutex<Vec<i32>>>;

    fn recorder() -> Recorded {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn adds(calls: &Recorded, n: i32) -> Step {
        let calls = calls.clone();
        FilterStep::simple(move |_| {
            calls.lock().unwrap().push(n);
            Ok(())
        })
    }

    /// Completion handler that records `n` whenever it is resolved,
    /// regardless of payload.
    fn marks(calls: &Recorded, n: i32) -> Completion<String, &'static str> {
        let calls = calls.clone();
        Completion::from_fn(move |_| calls.lock().unwrap().push(n))
    }

    #[test]
    fn invokes_each_step_returned_by_the_iterator() {
        let calls = recorder();

        run(vec![adds(&calls, 1), adds(&calls, 2)], RunOptions::new());

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn does_not_advance_if_the_filter_does_not() {
        let calls = recorder();

        let inner = calls.clone();
        let stalls: Step = FilterStep::continuation(move |_, _next, _callback| {
            inner.lock().unwrap().push(1);
            Ok(())
        });

        run(vec![stalls, adds(&calls, 2)], RunOptions::new());

        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[test]
    fn advances_when_the_filter_proceeds() {
        let calls = recorder();

        let passthrough: Step = FilterStep::continuation(|_, next, _callback| {
            next.proceed();
            Ok(())
        });

        run(vec![passthrough, adds(&calls, 1)], RunOptions::new());

        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[test]
    fn invokes_callback_passed_to_proceed_with() {
        let calls = recorder();

        let cb = marks(&calls, 1);
        let interposing: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb);
            Ok(())
        });

        run(vec![interposing], RunOptions::new());

        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[test]
    fn does_not_invoke_previous_callback_if_filter_does_not() {
        let calls = recorder();

        let cb1 = marks(&calls, 1);
        let outer: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb1);
            Ok(())
        });

        let cb2 = marks(&calls, 2);
        let swallowing: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb2);
            // Not resolving the previous callback.
            Ok(())
        });

        run(vec![outer, swallowing], RunOptions::new());

        assert_eq!(*calls.lock().unwrap(), vec![2]);
    }

    #[test]
    fn unwinds_through_each_callback_in_reverse_order() {
        let calls = recorder();

        let cb1 = marks(&calls, 1);
        let outer: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb1);
            Ok(())
        });

        let cb2 = marks(&calls, 2);
        let forwarding: Step = FilterStep::continuation(move |_, next, callback| {
            next.proceed_with(cb2);
            callback.succeed();
            Ok(())
        });

        run(vec![outer, forwarding], RunOptions::new());

        // Deepest completion first, then the enclosing filter's callback.
        assert_eq!(*calls.lock().unwrap(), vec![2, 1]);
    }

    #[test]
    fn resolves_handler_after_simple_steps() {
        let calls = recorder();

        let sink = calls.clone();
        run(
            vec![adds(&calls, 1)],
            RunOptions::new().on_done(move |_| sink.lock().unwrap().push(2)),
        );

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn runs_the_next_step_when_one_fails() {
        let calls = recorder();

        let failing: Step = FilterStep::simple(|_| Err("boom".to_string()));

        run(vec![failing, adds(&calls, 1)], RunOptions::new());

        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[test]
    fn passes_the_captured_error_to_the_handler() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let failing: Step = FilterStep::simple(|_| Err("oups!".to_string()));

        let sink = outcomes.clone();
        run(
            vec![failing],
            RunOptions::new().on_done(move |outcome| sink.lock().unwrap().push(outcome)),
        );

        assert_eq!(*outcomes.lock().unwrap(), vec![Err("oups!".to_string())]);
    }

    #[test]
    fn first_of_several_errors_wins() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let first: Step = FilterStep::simple(|_| Err("first".to_string()));
        let second: Step = FilterStep::simple(|_| Err("second".to_string()));

        let sink = outcomes.clone();
        run(
            vec![first, second],
            RunOptions::new().on_done(move |outcome| sink.lock().unwrap().push(outcome)),
        );

        assert_eq!(*outcomes.lock().unwrap(), vec![Err("first".to_string())]);
    }

    #[test]
    fn binds_every_step_to_the_given_scope() {
        struct Ctx;

        let scope = Arc::new(Ctx);
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        let second = seen.clone();
        let steps: Vec<FilterStep<Ctx, String, &'static str>> = vec![
            FilterStep::continuation(move |scope, next, _callback| {
                first.lock().unwrap().push(Arc::as_ptr(&scope) as usize);
                next.proceed();
                Ok(())
            }),
            FilterStep::simple(move |scope| {
                second.lock().unwrap().push(Arc::as_ptr(&scope) as usize);
                Ok(())
            }),
        ];

        run(steps, RunOptions::shared(scope.clone()));

        let expected = Arc::as_ptr(&scope) as usize;
        assert_eq!(*seen.lock().unwrap(), vec![expected, expected]);
    }

    #[test]
    fn passes_callback_error_back() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let sink = outcomes.clone();
        let cb = Completion::from_fn(move |outcome| sink.lock().unwrap().push(outcome));
        let outer: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb);
            Ok(())
        });

        let rejecting: Step = FilterStep::continuation(|_, _next, callback| {
            callback.fail("oups!".to_string());
            Ok(())
        });

        run(vec![outer, rejecting], RunOptions::new());

        assert_eq!(*outcomes.lock().unwrap(), vec![Err("oups!".to_string())]);
    }

    #[test]
    fn passes_callback_value_back() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let sink = outcomes.clone();
        let cb = Completion::from_fn(move |outcome| sink.lock().unwrap().push(outcome));
        let outer: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb);
            Ok(())
        });

        let producing: Step = FilterStep::continuation(|_, _next, callback| {
            callback.deliver("some value");
            Ok(())
        });

        run(vec![outer, producing], RunOptions::new());

        assert_eq!(
            *outcomes.lock().unwrap(),
            vec![Ok(Some("some value"))]
        );
    }

    #[test]
    fn proceed_then_resolving_the_callback_delivers_the_value_last() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let sink = outcomes.clone();
        let cb = Completion::from_fn(move |outcome| sink.lock().unwrap().push(outcome));
        let outer: Step = FilterStep::continuation(move |_, next, _callback| {
            next.proceed_with(cb);
            Ok(())
        });

        let eager: Step = FilterStep::continuation(|_, next, callback| {
            next.proceed();
            callback.deliver("V");
            Ok(())
        });

        run(vec![outer, eager], RunOptions::new());

        // Exhaustion resolves the callback once through `proceed`, then the
        // explicit delivery lands as a flagged repeat.
        assert_eq!(
            *outcomes.lock().unwrap(),
            vec![Ok(None), Ok(Some("V"))]
        );
    }

    #[test]
    fn then_stage_runs_between_exhaustion_and_the_handler() {
        let calls = recorder();

        let stage_calls = calls.clone();
        let sink = calls.clone();
        run(
            Vec::<Step>::new(),
            RunOptions::new()
                .then_stage(ThenStage::simple(move |_| {
                    stage_calls.lock().unwrap().push(1);
                    Ok(())
                }))
                .on_done(move |_| sink.lock().unwrap().push(2)),
        );

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn handoff_then_stage_owns_delivery() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let sink = outcomes.clone();
        run(
            Vec::<Step>::new(),
            RunOptions::new()
                .then_stage(ThenStage::handoff(|_, completion| {
                    completion.deliver("finished");
                    Ok(())
                }))
                .on_done(move |outcome| sink.lock().unwrap().push(outcome)),
        );

        assert_eq!(*outcomes.lock().unwrap(), vec![Ok(Some("finished"))]);
    }

    #[test]
    fn then_stage_error_reaches_the_handler() {
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let sink = outcomes.clone();
        run(
            Vec::<Step>::new(),
            RunOptions::new()
                .then_stage(ThenStage::simple(|_| Err("cleanup failed".to_string())))
                .on_done(move |outcome| sink.lock().unwrap().push(outcome)),
        );

        assert_eq!(
            *outcomes.lock().unwrap(),
            vec![Err("cleanup failed".to_string())]
        );
    }

    #[test]
    fn then_stage_still_runs_after_an_earlier_fault() {
        let calls = recorder();
        let outcomes: Arc<Mutex<Vec<ChainOutcome<String, &'static str>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let failing: Step = FilterStep::simple(|_| Err("first".to_string()));

        let stage_calls = calls.clone();
        let sink = outcomes.clone();
        run(
            vec![failing],
            RunOptions::new()
                .then_stage(ThenStage::simple(move |_| {
                    stage_calls.lock().unwrap().push(1);
                    Ok(())
                }))
                .on_done(move |outcome| sink.lock().unwrap().push(outcome)),
        );

        // The stage ran, and the step's error still won through the adapter.
        assert_eq!(*calls.lock().unwrap(), vec![1]);
        assert_eq!(*outcomes.lock().unwrap(), vec![Err("first".to_string())]);
    }

    #[test]
    fn chain_state_is_not_resumable_after_its_step_faulted() {
        let calls = recorder();
        let parked: Arc<Mutex<Option<crate::engine::Next<(), String, &'static str>>>> =
            Arc::new(Mutex::new(None));

        let stash = parked.clone();
        let faulty: Step = FilterStep::continuation(move |_, next, _callback| {
            *stash.lock().unwrap() = Some(next);
            Err("faulted after stashing".to_string())
        });

        run(vec![faulty, adds(&calls, 1)], RunOptions::new());

        // The executor reclaimed the chain and drove it to the next step.
        assert_eq!(*calls.lock().unwrap(), vec![1]);

        // Consuming the stashed handle afterwards is a logged no-op.
        parked.lock().unwrap().take().unwrap().proceed();
        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }
}
