// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::engine::completion::{ChainOutcome, Completion, DoneFn};
use crate::steps::ThenStage;

/// Named-field configuration for [`run`](crate::engine::run): the scope
/// bound to every step, an optional finishing stage, and an optional
/// completion handler.
///
/// Every useful combination is a builder preset:
///
/// | configuration | expression |
/// |---|---|
/// | nothing | `RunOptions::new()` |
/// | handler | `RunOptions::new().on_done(f)` |
/// | scope | `RunOptions::scoped(scope)` |
/// | scope + handler | `RunOptions::scoped(scope).on_done(f)` |
/// | finishing stage + handler | `RunOptions::new().then_stage(t).on_done(f)` |
/// | everything | `RunOptions::scoped(scope).then_stage(t).on_done(f)` |
///
/// The iterator itself is a required parameter of `run`, so "ran a chain
/// without steps to pull from" is not a representable state.
pub struct RunOptions<S, E, V> {
    scope: Arc<S>,
    then_stage: Option<ThenStage<S, E, V>>,
    done: Option<DoneFn<E, V>>,
}

impl<E, V> RunOptions<(), E, V> {
    /// Options for a chain with no scope of its own.
    pub fn new() -> Self {
        Self::shared(Arc::new(()))
    }
}

impl<E, V> Default for RunOptions<(), E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E, V> RunOptions<S, E, V> {
    /// Bind `scope` as the execution context cloned into every step and the
    /// finishing stage.
    pub fn scoped(scope: S) -> Self {
        Self::shared(Arc::new(scope))
    }

    /// Like [`RunOptions::scoped`] for a scope the caller keeps a handle to.
    pub fn shared(scope: Arc<S>) -> Self {
        RunOptions {
            scope,
            then_stage: None,
            done: None,
        }
    }

    /// Finishing stage to run once the steps are exhausted.
    pub fn then_stage(mut self, stage: ThenStage<S, E, V>) -> Self {
        self.then_stage = Some(stage);
        self
    }

    /// Completion handler for the whole chain.
    pub fn on_done<F>(mut self, handler: F) -> Self
    where
        F: FnMut(ChainOutcome<E, V>) + Send + 'static,
    {
        self.done = Some(Box::new(handler));
        self
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Arc<S>, Option<ThenStage<S, E, V>>, Completion<E, V>) {
        (
            self.scope,
            self.then_stage,
            Completion::from_done(self.done),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_options_carry_no_stage_and_no_handler() {
        let options: RunOptions<(), String, ()> = RunOptions::new();
        let (_, then_stage, done) = options.into_parts();

        assert!(then_stage.is_none());
        assert!(!done.is_set());
    }

    #[test]
    fn scoped_options_share_the_given_allocation() {
        let scope = Arc::new("ctx");
        let options: RunOptions<&str, String, ()> = RunOptions::shared(scope.clone());
        let (held, _, _) = options.into_parts();

        assert!(Arc::ptr_eq(&scope, &held));
    }

    #[test]
    fn on_done_installs_a_handler() {
        let options: RunOptions<(), String, ()> = RunOptions::new().on_done(|_| {});
        let (_, _, done) = options.into_parts();

        assert!(done.is_set());
    }

    #[test]
    fn then_stage_is_carried_through() {
        let options: RunOptions<(), String, ()> =
            RunOptions::new().then_stage(ThenStage::simple(|_| Ok(())));
        let (_, then_stage, _) = options.into_parts();

        assert!(matches!(then_stage, Some(ThenStage::Simple(_))));
    }
}
