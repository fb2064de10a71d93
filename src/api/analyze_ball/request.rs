// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-ball request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Largest accepted data URL: the decoded limit grown by base64 overhead
const MAX_DATA_URL_LEN: usize = MAX_IMAGE_SIZE / 3 * 4 + 1024;

/// Request body of `POST /api/analyze-ball`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeBallRequest {
    /// Data URL: `data:<mime>;base64,<payload>`
    #[serde(default)]
    pub image: Option<String>,
}

impl AnalyzeBallRequest {
    /// Validate the request, returning the data URL
    pub fn validate(&self) -> Result<&str, ApiError> {
        let image = self
            .image
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::ValidationError {
                field: "image".to_string(),
                message: "No image provided".to_string(),
            })?;

        if image.len() > MAX_DATA_URL_LEN {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: format!("image exceeds maximum size of {} bytes", MAX_IMAGE_SIZE),
            });
        }

        Ok(image)
    }
}
