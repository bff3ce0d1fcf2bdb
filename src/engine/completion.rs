// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Completion handler ("done") plumbing for chain runs.
//!
//! A [`Completion`] is a cloneable handle over one underlying handler cell.
//! Clones mirror the aliasing of the `done` callback through a chain: the
//! handle a continuation filter receives as `callback`, the one carried by
//! its `Next`, and the executor's own are all views of the same handler.

use std::sync::{Arc, Mutex};

use crate::engine::lock;
use crate::observability::messages::engine::{CompletionReplayed, OutcomeDiscarded};
use crate::observability::messages::StructuredLog;

/// Outcome delivered to a completion handler: `Ok(None)` for plain success,
/// `Ok(Some(value))` when the chain produced a value, `Err(error)` on
/// failure. Both payload types are opaque to the executor.
pub type ChainOutcome<E, V> = Result<Option<V>, E>;

/// Boxed completion handler.
pub type DoneFn<E, V> = Box<dyn FnMut(ChainOutcome<E, V>) + Send>;

struct Cell<E, V> {
    handler: Option<DoneFn<E, V>>,
    fires: u32,
}

/// Cloneable handle to a chain's completion handler.
///
/// Delivery policy: a handle with no handler configured discards outcomes
/// silently. A handler may be resolved more than once (some chain shapes
/// depend on a step proceeding and then resolving its callback with a value),
/// but every delivery after the first emits a warn-level
/// [`CompletionReplayed`] event.
pub struct Completion<E, V> {
    cell: Arc<Mutex<Cell<E, V>>>,
}

impl<E, V> Clone for Completion<E, V> {
    fn clone(&self) -> Self {
        Completion {
            cell: self.cell.clone(),
        }
    }
}

impl<E, V> Completion<E, V> {
    /// A handler built from a closure, ready to pass to
    /// [`Next::proceed_with`](crate::engine::Next::proceed_with).
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: FnMut(ChainOutcome<E, V>) + Send + 'static,
    {
        Self::from_done(Some(Box::new(handler)))
    }

    pub(crate) fn from_done(done: Option<DoneFn<E, V>>) -> Self {
        Completion {
            cell: Arc::new(Mutex::new(Cell {
                handler: done,
                fires: 0,
            })),
        }
    }

    /// Whether a handler is installed behind this handle.
    pub fn is_set(&self) -> bool {
        let cell = lock(&self.cell);
        cell.handler.is_some() || cell.fires > 0
    }

    /// Deliver `outcome` to the handler. Returns whether a handler ran.
    pub fn resolve(&self, outcome: ChainOutcome<E, V>) -> bool {
        // The handler leaves the cell for the duration of the call so user
        // code never runs under the crate's lock.
        let mut handler = {
            let mut cell = lock(&self.cell);
            let Some(handler) = cell.handler.take() else {
                if cell.fires == 0 {
                    OutcomeDiscarded.log();
                } else {
                    // Re-entrant resolution while the handler is running.
                    CompletionReplayed {
                        fires: cell.fires + 1,
                    }
                    .log();
                }
                return false;
            };
            cell.fires += 1;
            if cell.fires > 1 {
                CompletionReplayed { fires: cell.fires }.log();
            }
            handler
        };
        handler(outcome);
        let mut cell = lock(&self.cell);
        if cell.handler.is_none() {
            cell.handler = Some(handler);
        }
        true
    }

    /// Resolve with no error and no value.
    pub fn succeed(&self) -> bool {
        self.resolve(Ok(None))
    }

    /// Resolve with a value.
    pub fn deliver(&self, value: V) -> bool {
        self.resolve(Ok(Some(value)))
    }

    /// Resolve with an error.
    pub fn fail(&self, error: E) -> bool {
        self.resolve(Err(error))
    }
}

impl<E, V> Completion<E, V>
where
    E: Send + 'static,
    V: Send + 'static,
{
    /// Adapter for a faulted step position: whatever the returned completion
    /// is later resolved with is discarded, and `error` is forwarded to this
    /// handler instead. Nesting adapters therefore keeps the first error.
    ///
    /// The error is forwarded at most once; repeat resolutions of the adapter
    /// are dropped.
    pub(crate) fn faulted(self, error: E) -> Completion<E, V> {
        let mut captured = Some(error);
        Completion::from_fn(move |_outcome| {
            if let Some(error) = captured.take() {
                self.resolve(Err(error));
            }
        })
    }
}
