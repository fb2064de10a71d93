// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::analyze_ball::{analyze_ball_handler, ANALYZE_BALL_PATH};
use crate::storage::ImageStore;
use crate::vision::{FrameAnalyzer, PreprocessConfig};

/// Request bodies carry base64 images; allow the 10MB image limit plus
/// encoding overhead.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no inference service is configured
    pub analyzer: Option<Arc<dyn FrameAnalyzer>>,
    pub preprocess: PreprocessConfig,
    pub image_store: Option<Arc<dyn ImageStore>>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn FrameAnalyzer>, preprocess: PreprocessConfig) -> Self {
        Self {
            analyzer: Some(analyzer),
            preprocess,
            image_store: None,
        }
    }

    pub fn with_image_store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.image_store = Some(store);
        self
    }

    /// State for a server whose inference service could not be set up
    pub fn unconfigured(preprocess: PreprocessConfig) -> Self {
        Self {
            analyzer: None,
            preprocess,
            image_store: None,
        }
    }

    pub fn new_for_test() -> Self {
        Self::unconfigured(PreprocessConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub inference: bool,
    pub image_store: bool,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(ANALYZE_BALL_PATH, post(analyze_ball_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        inference: state.analyzer.is_some(),
        image_store: state.image_store.is_some(),
    })
}
