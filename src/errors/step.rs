// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made error payload for chains without a domain error type.

use thiserror::Error;

/// Convenience error for filter chains that do not define their own error
/// type.
///
/// Chains are generic over their error payload and the executor never
/// inspects it; this type covers the common cases so small pipelines do not
/// have to invent one.
#[derive(Debug, Error)]
pub enum StepError {
    /// A step rejected its input or failed an internal check.
    #[error("filter step failed: {0}")]
    Failed(String),

    /// A step surfaced an underlying error unchanged.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StepError {
    /// Shorthand for [`StepError::Failed`].
    pub fn msg(message: impl Into<String>) -> Self {
        StepError::Failed(message.into())
    }
}
