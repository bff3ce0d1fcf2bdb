// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::engine::Completion;

/// Finishing step run exactly once after the iterator is exhausted, before
/// the outer completion fires.
///
/// * [`ThenStage::Simple`] is fire-and-forget: the completion resolves with
///   no error right after the stage returns, or with the stage's error.
/// * [`ThenStage::Handoff`] receives the pending completion handle and
///   assumes responsibility for resolving it.
pub enum ThenStage<S, E, V> {
    Simple(Box<dyn FnOnce(Arc<S>) -> Result<(), E> + Send>),
    Handoff(Box<dyn FnOnce(Arc<S>, Completion<E, V>) -> Result<(), E> + Send>),
}

impl<S, E, V> ThenStage<S, E, V> {
    /// A fire-and-forget finishing stage.
    pub fn simple<F>(stage: F) -> Self
    where
        F: FnOnce(Arc<S>) -> Result<(), E> + Send + 'static,
    {
        ThenStage::Simple(Box::new(stage))
    }

    /// A finishing stage that takes over delivery of the completion.
    pub fn handoff<F>(stage: F) -> Self
    where
        F: FnOnce(Arc<S>, Completion<E, V>) -> Result<(), E> + Send + 'static,
    {
        ThenStage::Handoff(Box::new(stage))
    }
}

impl<S, E, V> fmt::Debug for ThenStage<S, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThenStage::Simple(_) => f.write_str("ThenStage::Simple"),
            ThenStage::Handoff(_) => f.write_str("ThenStage::Handoff"),
        }
    }
}
