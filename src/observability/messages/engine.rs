// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain executor lifecycle and delivery events.
//!
//! This module contains message types for logging events related to:
//! * Step failures folded into the completion chain
//! * Completion handler delivery anomalies
//! * Continuation handles consumed after their position was reclaimed

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A filter step returned an error; the error was captured for the
/// completion handler and iteration continued.
///
/// The error payload itself is opaque to the executor and is not formatted
/// into the event.
///
/// # Log Level
/// `debug!` - Expected control flow, surfaced through the completion
pub struct StepFaulted {
    pub position: usize,
}

impl Display for StepFaulted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Filter step {} faulted; error captured for the completion handler",
            self.position
        )
    }
}

impl StructuredLog for StepFaulted {
    fn log(&self) {
        tracing::debug!(position = self.position, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("step_faulted", span_name = name, position = self.position)
    }
}

/// A completion handler was resolved more than once.
///
/// Repeat delivery is permitted (some chain shapes proceed and then
/// resolve their callback with a value) but flagged, since it usually
/// indicates a step resolving a handler it already handed downstream.
///
/// # Log Level
/// `warn!` - Possible caller-discipline violation
pub struct CompletionReplayed {
    pub fires: u32,
}

impl Display for CompletionReplayed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Completion handler resolved again (delivery {})",
            self.fires
        )
    }
}

impl StructuredLog for CompletionReplayed {
    fn log(&self) {
        tracing::warn!(fires = self.fires, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("completion_replayed", span_name = name, fires = self.fires)
    }
}

/// An outcome reached a completion with no handler configured and was
/// discarded. This is the observable form of "the error was lost".
///
/// # Log Level
/// `debug!` - Valid terminal state for handler-less chains
pub struct OutcomeDiscarded;

impl Display for OutcomeDiscarded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Chain outcome discarded: no completion handler configured")
    }
}

impl StructuredLog for OutcomeDiscarded {
    fn log(&self) {
        tracing::debug!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("outcome_discarded", span_name = name)
    }
}

/// A stored `Next` handle was consumed after the executor had already
/// reclaimed the chain state from its faulted step.
///
/// # Log Level
/// `warn!` - The resumption is ignored
pub struct NextIgnored {
    pub position: usize,
}

impl Display for NextIgnored {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Continuation for step {} ignored: chain state was reclaimed after the step faulted",
            self.position
        )
    }
}

impl StructuredLog for NextIgnored {
    fn log(&self) {
        tracing::warn!(position = self.position, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("next_ignored", span_name = name, position = self.position)
    }
}
