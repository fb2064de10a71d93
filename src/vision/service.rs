// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference service trait definition

use async_trait::async_trait;

use super::types::{AnalysisRequest, ServiceError};

/// A vision-capable inference service.
///
/// Accepts one prompt+image request and returns the model's free-form reply
/// text. Implementations issue exactly one upstream call per invocation and
/// never retry.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Send the request and wait for the reply text.
    ///
    /// # Errors
    /// [`ServiceError`] on transport failure, timeout, non-success status,
    /// or an empty reply.
    async fn complete(&self, request: &AnalysisRequest) -> Result<String, ServiceError>;

    /// Name of the backing model, for logging
    fn model_name(&self) -> &str;

    /// Probe whether the service is reachable
    async fn health_check(&self) -> bool {
        true
    }
}
