// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client for a running ball-qc API server
//!
//! Lets an operator station drive analyses through a shared backend instead
//! of calling the vision model directly.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::api::analyze_ball::{AnalyzeBallRequest, ANALYZE_BALL_PATH};
use crate::api::errors::ErrorResponse;
use crate::vision::{AnalysisVerdict, EncodedFrame, FrameAnalyzer, ServiceError};

/// Posts frames to `POST /api/analyze-ball` and returns the server's verdict
pub struct BackendClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url, ANALYZE_BALL_PATH)
    }
}

#[async_trait]
impl FrameAnalyzer for BackendClient {
    async fn analyze(&self, frame: EncodedFrame) -> Result<AnalysisVerdict, ServiceError> {
        let body = AnalyzeBallRequest {
            image: Some(frame.to_data_url()),
        };

        let response = self
            .client
            .post(self.analyze_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    ServiceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|r| r.error)
                .unwrap_or(text);
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let verdict: AnalysisVerdict = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        debug!("Backend verdict: {:?}", verdict);
        Ok(verdict)
    }
}
