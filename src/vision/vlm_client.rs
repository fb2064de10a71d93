// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM client for ball inspection via an OpenAI-compatible chat API

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::service::InferenceService;
use super::types::{AnalysisRequest, ServiceError};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(serde::Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(serde::Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

/// Connection settings for the VLM
#[derive(Debug, Clone)]
pub struct VlmConfig {
    /// Base URL, e.g. `https://api.openai.com`
    pub endpoint: String,
    pub model_name: String,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for VlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            model_name: "gpt-4o".to_string(),
            api_key: None,
            timeout_secs: 120,
            max_tokens: 300,
        }
    }
}

/// Client for calling a vision model via OpenAI-compatible API
pub struct VlmClient {
    client: Client,
    endpoint: String,
    model_name: String,
    api_key: Option<String>,
    timeout_secs: u64,
    max_tokens: u32,
}

impl VlmClient {
    /// Create a new VLM client
    pub fn new(config: VlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM client configured: endpoint={}, model={}",
            endpoint, config.model_name
        );

        Ok(Self {
            client,
            endpoint,
            model_name: config.model_name,
            api_key: config.api_key,
            timeout_secs: config.timeout_secs,
            max_tokens: config.max_tokens,
        })
    }

    /// Base URL without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn chat_request(&self, request: &AnalysisRequest) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": request.prompt()},
                    {"type": "image_url", "image_url": {"url": request.frame().to_data_url()}}
                ]),
            }],
            max_tokens: self.max_tokens,
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl InferenceService for VlmClient {
    async fn complete(&self, request: &AnalysisRequest) -> Result<String, ServiceError> {
        let start = std::time::Instant::now();
        let body = self.chat_request(request);

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(e)
            } else {
                ServiceError::InvalidResponse(e.to_string())
            }
        })?;

        let reply = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ServiceError::EmptyReply)?;

        debug!(
            "VLM reply in {}ms ({} tokens): {:?}",
            start.elapsed().as_millis(),
            chat_response.usage.map(|u| u.total_tokens).unwrap_or(0),
            reply
        );

        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn health_check(&self) -> bool {
        let mut builder = self.client.get(format!("{}/v1/models", self.endpoint));
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        match builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("VLM health check failed: {}", e);
                false
            }
        }
    }
}
