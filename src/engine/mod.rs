// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod chain;
pub mod completion;
#[cfg(test)]
pub mod integration_tests;

pub use chain::{run, Next};
pub use completion::{ChainOutcome, Completion, DoneFn};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks shared interpreter state, absorbing poisoning: a filter that
/// panicked on another thread must not wedge the surviving chain handles.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
