// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod filter;
mod then_stage;

pub use filter::{ContinuationFilter, FilterStep, SimpleFilter};
pub use then_stage::ThenStage;
