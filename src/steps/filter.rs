// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::engine::{Completion, Next};

/// Boxed payload of a simple filter: runs against the scope with no
/// continuation capability.
pub type SimpleFilter<S, E> = Box<dyn FnOnce(Arc<S>) -> Result<(), E> + Send>;

/// Boxed payload of a continuation filter: receives the [`Next`] handle for
/// the rest of the chain and the completion handler currently in effect.
pub type ContinuationFilter<S, E, V> =
    Box<dyn FnOnce(Arc<S>, Next<S, E, V>, Completion<E, V>) -> Result<(), E> + Send>;

/// One unit of work in a chain.
///
/// The variant is chosen by the author at construction time and decides how
/// the executor invokes the step:
///
/// * [`FilterStep::Simple`] runs against the scope, and the chain advances by
///   itself once the step returns.
/// * [`FilterStep::Continuation`] additionally receives a [`Next`] handle and
///   a clone of the completion handler currently in effect (`callback`). The
///   chain advances only if the step consumes `next`; dropping the handle
///   halts the chain at this position (no later step runs, no completion
///   fires), which is the valid way to take over delivery entirely.
///
/// Returning `Err` from either variant does not stop iteration. The error is
/// captured and travels to whichever completion handler is eventually
/// resolved downstream of this position.
///
/// Type parameters: `S` is the scope, `E` the opaque error payload, `V` the
/// opaque value payload carried by completions.
pub enum FilterStep<S, E, V> {
    Simple(SimpleFilter<S, E>),
    Continuation(ContinuationFilter<S, E, V>),
}

impl<S, E, V> FilterStep<S, E, V> {
    /// A step with no continuation capability.
    pub fn simple<F>(filter: F) -> Self
    where
        F: FnOnce(Arc<S>) -> Result<(), E> + Send + 'static,
    {
        FilterStep::Simple(Box::new(filter))
    }

    /// A step that must consume its [`Next`] handle to advance the chain.
    pub fn continuation<F>(filter: F) -> Self
    where
        F: FnOnce(Arc<S>, Next<S, E, V>, Completion<E, V>) -> Result<(), E> + Send + 'static,
    {
        FilterStep::Continuation(Box::new(filter))
    }
}

impl<S, E, V> fmt::Debug for FilterStep<S, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStep::Simple(_) => f.write_str("FilterStep::Simple"),
            FilterStep::Continuation(_) => f.write_str("FilterStep::Continuation"),
        }
    }
}
