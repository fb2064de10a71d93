// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-ball endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, info, warn};

use super::request::AnalyzeBallRequest;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::storage::capture_filename;
use crate::vision::image_utils::{decode_base64_image, mime_to_extension, parse_data_url};
use crate::vision::{preprocess, AnalysisVerdict, ServiceError};

/// POST /api/analyze-ball - Grade a photo of a decorative ball
///
/// # Request
/// - `image`: data URL, `data:<mime>;base64,<payload>` (required)
///
/// # Response
/// - `status`: `pass`, `fail`, `no_ball` or `quality_error`
/// - `message`: reason given by the model, or the fallback message when the
///   reply could not be parsed
///
/// # Errors
/// - 400 Bad Request: body is not a JSON object with a string `image`,
///   missing image, malformed data URL, undecodable image
/// - 503 Service Unavailable: no inference service configured
/// - 502 Bad Gateway / 504 Gateway Timeout: the inference call failed
pub async fn analyze_ball_handler(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeBallRequest>, JsonRejection>,
) -> Result<Json<AnalysisVerdict>, ApiError> {
    // 1. Parse and validate request
    let Json(request) = body.map_err(|rejection| {
        warn!("Analyze request body rejected: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    let data_url = request.validate().map_err(|e| {
        warn!("Analyze request rejected: {}", e);
        e
    })?;

    // 2. Inference must be configured before any work is done
    let analyzer = state.analyzer.clone().ok_or_else(|| {
        warn!("Inference service not available");
        ApiError::from(ServiceError::NotConfigured)
    })?;

    // 3. Decode
    let (mime, payload) = parse_data_url(data_url)?;
    let raw = decode_base64_image(payload).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::from(e)
    })?;
    debug!("Decoded {} image: {}x{}", mime, raw.width, raw.height);

    // 4. Keep a copy when a capture directory is configured
    if let Some(store) = state.image_store.as_ref() {
        let filename = capture_filename(mime_to_extension(mime));
        if let Err(e) = store.save(payload, &filename).await {
            warn!("Failed to save captured image {}: {}", filename, e);
        }
    }

    // 5. Preprocess and grade
    let frame = preprocess(&raw, &state.preprocess)?;
    let verdict = analyzer.analyze(frame).await.map_err(|e| {
        warn!("Error during analysis: {}", e);
        ApiError::from(e)
    })?;

    info!("Verdict: {} - {}", verdict.status, verdict.message);
    Ok(Json(verdict))
}
