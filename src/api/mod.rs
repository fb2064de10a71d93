// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze_ball;
pub mod errors;
pub mod http_server;

pub use analyze_ball::{analyze_ball_handler, AnalyzeBallRequest, ANALYZE_BALL_PATH};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_router, start_server, AppState, HealthResponse};
