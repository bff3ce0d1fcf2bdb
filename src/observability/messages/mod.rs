// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `engine` - chain executor lifecycle and delivery events

use tracing::Span;

/// Structured emission for a diagnostic message.
///
/// `log()` emits the message at its designated level with its fields
/// attached; `span()` opens a span carrying the same fields for callers
/// that want to scope further work to the event.
pub trait StructuredLog {
    fn log(&self);
    fn span(&self, name: &str) -> Span;
}

pub mod engine;
