// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // run options
pub mod engine;     // chain executor
pub mod errors;     // error handling
pub mod observability;
pub mod steps;      // filter step definitions
