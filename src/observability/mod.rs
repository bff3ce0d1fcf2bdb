// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Centralized message types for all diagnostic logging in the chain
//! executor. Message types follow a struct-based pattern with `Display`
//! trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the engine
//! * Enable future internationalization without code changes
//! * Provide consistent, structured logging output
//!
//! # Usage
//!
//! ```rust
//! use filament::observability::messages::engine::StepFaulted;
//!
//! let msg = StepFaulted { position: 3 };
//!
//! tracing::debug!("{}", msg);
//! ```

pub mod messages;
