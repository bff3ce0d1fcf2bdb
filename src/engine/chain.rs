// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential chain executor with continuation-passing control flow.
//!
//! The interpreter pulls filter steps from a lazily-consumed iterator and
//! drives them one at a time. A [`FilterStep::Simple`] step runs and the
//! chain advances by itself; a [`FilterStep::Continuation`] step receives a
//! [`Next`] handle owning the rest of the chain and decides whether, when,
//! and with which completion handler the chain resumes. Once the iterator is
//! exhausted an optional [`ThenStage`] runs, then the completion in effect
//! resolves.
//!
//! # Control flow
//!
//! ```text
//! run ─► advance ─► step 0 (simple)      errors fold into an adapter
//!            │                           completion, iteration continues
//!            ▼
//!        step 1 (continuation) ── Next handed to the step
//!            │                        │
//!            ▼                        ▼ (now, later, or never)
//!        returns               Next::proceed ─► advance ─► ... ─► finish
//! ```
//!
//! Suspension is caller-driven: a continuation step that stores its `Next`
//! and returns leaves the chain parked; consuming the handle later, from
//! any thread, resumes it with everything it needs (remaining iterator,
//! scope, then-stage, completion).
//!
//! # Examples
//!
//! ```
//! use filament::config::RunOptions;
//! use filament::engine::run;
//! use filament::steps::FilterStep;
//!
//! let steps: Vec<FilterStep<(), String, ()>> = vec![
//!     FilterStep::simple(|_scope| Ok(())),
//!     FilterStep::continuation(|_scope, next, _callback| {
//!         next.proceed();
//!         Ok(())
//!     }),
//! ];
//!
//! run(
//!     steps,
//!     RunOptions::new().on_done(|outcome| assert!(outcome.is_ok())),
//! );
//! ```

use std::sync::{Arc, Mutex};

use crate::config::RunOptions;
use crate::engine::completion::Completion;
use crate::engine::lock;
use crate::observability::messages::engine::{NextIgnored, StepFaulted};
use crate::observability::messages::StructuredLog;
use crate::steps::{FilterStep, ThenStage};

/// Per-run state threaded through the interpreter. Dropped when the run
/// completes or halts; the executor keeps nothing between runs.
struct ChainCore<S, E, V> {
    steps: Box<dyn Iterator<Item = FilterStep<S, E, V>> + Send>,
    scope: Arc<S>,
    then_stage: Option<ThenStage<S, E, V>>,
    position: usize,
}

/// Handle to the rest of the chain, given to a continuation filter.
///
/// Consuming the handle resumes the chain; dropping it halts the chain at
/// this position (no later step runs, no completion fires on its own). The
/// handle owns everything needed to resume (remaining iterator, scope,
/// then-stage, completion), so it may be stored and consumed later, from
/// any thread.
///
/// A single handle can resume the chain at most once: both methods take
/// `self` by value.
pub struct Next<S, E, V> {
    slot: Arc<Mutex<Option<ChainCore<S, E, V>>>>,
    done: Completion<E, V>,
    position: usize,
}

impl<S, E, V> Next<S, E, V>
where
    S: Send + Sync + 'static,
    E: Send + 'static,
    V: Send + 'static,
{
    /// Resume the chain with the completion handler unchanged.
    pub fn proceed(self) {
        let Next {
            slot,
            done,
            position,
        } = self;
        resume(&slot, done, position);
    }

    /// Resume the chain with `callback` as the completion handler for
    /// everything downstream.
    ///
    /// Building `callback` over a clone of this step's own handler produces
    /// the onion-style unwind: the deepest completion fires first, then each
    /// enclosing step's callback in reverse order, provided each explicitly
    /// forwards.
    pub fn proceed_with(self, callback: Completion<E, V>) {
        let Next {
            slot,
            done: _,
            position,
        } = self;
        resume(&slot, callback, position);
    }
}

fn resume<S, E, V>(
    slot: &Mutex<Option<ChainCore<S, E, V>>>,
    done: Completion<E, V>,
    position: usize,
) where
    S: Send + Sync + 'static,
    E: Send + 'static,
    V: Send + 'static,
{
    match lock(slot).take() {
        Some(core) => advance(core, done),
        // The owning step failed and the executor reclaimed the chain state.
        None => NextIgnored { position }.log(),
    }
}

/// Execute a chain of filter steps.
///
/// Steps run in strict iterator order, each invoked with a clone of the
/// scope, until a continuation step declines to proceed or the iterator is
/// exhausted. `run` returns nothing: completion, successful or not, is
/// signalled exclusively through the completion handler configured in
/// `options`, and a chain whose steps defer may outlive this call.
///
/// A step returning `Err` never aborts the chain. The error is captured and
/// delivered to whichever completion handler is eventually resolved from
/// that position onward; if none ever is, the error is dropped (a debug
/// event records the discard).
pub fn run<S, E, V, I>(steps: I, options: RunOptions<S, E, V>)
where
    I: IntoIterator<Item = FilterStep<S, E, V>>,
    I::IntoIter: Send + 'static,
    S: Send + Sync + 'static,
    E: Send + 'static,
    V: Send + 'static,
{
    let (scope, then_stage, done) = options.into_parts();
    advance(
        ChainCore {
            steps: Box::new(steps.into_iter()),
            scope,
            then_stage,
            position: 0,
        },
        done,
    );
}

fn advance<S, E, V>(mut core: ChainCore<S, E, V>, mut done: Completion<E, V>)
where
    S: Send + Sync + 'static,
    E: Send + 'static,
    V: Send + 'static,
{
    loop {
        let Some(step) = core.steps.next() else {
            return finish(core, done);
        };
        let position = core.position;
        core.position += 1;

        match step {
            FilterStep::Simple(filter) => {
                if let Err(error) = filter(core.scope.clone()) {
                    StepFaulted { position }.log();
                    done = done.faulted(error);
                }
            }
            FilterStep::Continuation(filter) => {
                let scope = core.scope.clone();
                let slot = Arc::new(Mutex::new(Some(core)));
                let next = Next {
                    slot: slot.clone(),
                    done: done.clone(),
                    position,
                };
                match filter(scope, next, done.clone()) {
                    // The step owns the chain now: it resumed it
                    // synchronously, stored it for later, or halted it.
                    Ok(()) => return,
                    Err(error) => {
                        StepFaulted { position }.log();
                        let reclaimed = lock(&slot).take();
                        match reclaimed {
                            Some(rest) => {
                                core = rest;
                                done = done.faulted(error);
                            }
                            None => {
                                // The step consumed `next` before failing, so
                                // the chain is already advancing elsewhere.
                                // The error still reaches the handler in
                                // effect here.
                                done.fail(error);
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}

fn finish<S, E, V>(core: ChainCore<S, E, V>, done: Completion<E, V>) {
    let ChainCore {
        scope, then_stage, ..
    } = core;
    match then_stage {
        None => {
            if done.is_set() {
                done.succeed();
            }
        }
        Some(ThenStage::Simple(stage)) => match stage(scope) {
            Ok(()) => {
                done.succeed();
            }
            Err(error) => {
                done.fail(error);
            }
        },
        Some(ThenStage::Handoff(stage)) => {
            if let Err(error) = stage(scope, done.clone()) {
                done.fail(error);
            }
        }
    }
}
