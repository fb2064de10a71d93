// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-ball API endpoint module
//!
//! Provides POST /api/analyze-ball for grading a single still.

pub mod handler;
pub mod request;

pub use handler::analyze_ball_handler;
pub use request::AnalyzeBallRequest;

/// Route path of the analysis endpoint
pub const ANALYZE_BALL_PATH: &str = "/api/analyze-ball";
