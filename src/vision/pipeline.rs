// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame analysis: request building, the inference call, and reply
//! interpretation composed behind one trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::interpreter::interpret_reply;
use super::prompts::build_analysis_request;
use super::service::InferenceService;
use super::types::{AnalysisVerdict, EncodedFrame, ServiceError};

/// Grades one preprocessed frame.
///
/// A reply that cannot be parsed is not an error: it comes back as a
/// `quality_error` verdict. Only a failed service call is an `Err`.
#[async_trait]
pub trait FrameAnalyzer: Send + Sync {
    async fn analyze(&self, frame: EncodedFrame) -> Result<AnalysisVerdict, ServiceError>;
}

/// In-process analyzer: rubric request to an [`InferenceService`], then
/// [`interpret_reply`] on the text it returns.
pub struct VisionAnalyzer {
    service: Arc<dyn InferenceService>,
}

impl VisionAnalyzer {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<dyn InferenceService> {
        &self.service
    }
}

#[async_trait]
impl FrameAnalyzer for VisionAnalyzer {
    async fn analyze(&self, frame: EncodedFrame) -> Result<AnalysisVerdict, ServiceError> {
        debug!(
            "Analyzing {}x{} frame with {}",
            frame.width,
            frame.height,
            self.service.model_name()
        );
        let request = build_analysis_request(frame);
        let reply = self.service.complete(&request).await?;
        Ok(interpret_reply(&reply))
    }
}
