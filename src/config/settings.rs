// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from the environment

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::vision::{PreprocessConfig, VlmConfig};

/// Configuration for the ball-qc server and CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host for the HTTP API
    pub api_host: String,
    /// Bind port for the HTTP API
    pub api_port: u16,
    /// Vision model connection settings
    pub vlm: VlmConfig,
    /// Frame dimension bounds
    pub preprocess: PreprocessConfig,
    /// Directory for captured images; persistence is off when unset
    pub capture_dir: Option<PathBuf>,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env_parse("API_PORT", defaults.api_port),
            vlm: VlmConfig {
                endpoint: env::var("VLM_ENDPOINT").unwrap_or(defaults.vlm.endpoint),
                model_name: env::var("VLM_MODEL").unwrap_or(defaults.vlm.model_name),
                api_key: env::var("VLM_API_KEY")
                    .or_else(|_| env::var("OPENAI_API_KEY"))
                    .ok()
                    .filter(|k| !k.is_empty()),
                timeout_secs: env_parse("VLM_TIMEOUT_SECS", defaults.vlm.timeout_secs),
                max_tokens: env_parse("VLM_MAX_TOKENS", defaults.vlm.max_tokens),
            },
            preprocess: PreprocessConfig {
                max_width: env_parse("MAX_FRAME_WIDTH", defaults.preprocess.max_width),
                max_height: env_parse("MAX_FRAME_HEIGHT", defaults.preprocess.max_height),
            },
            capture_dir: env::var("CAPTURE_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.vlm.endpoint.trim().is_empty() {
            return Err(anyhow!("VLM endpoint must not be empty"));
        }
        if self.vlm.model_name.trim().is_empty() {
            return Err(anyhow!("VLM model name must not be empty"));
        }
        if self.vlm.timeout_secs == 0 {
            return Err(anyhow!("VLM timeout must be greater than 0"));
        }
        if self.vlm.max_tokens == 0 {
            return Err(anyhow!("VLM max tokens must be greater than 0"));
        }
        if self.preprocess.max_width == 0 || self.preprocess.max_height == 0 {
            return Err(anyhow!("Frame bounds must be greater than 0"));
        }
        Ok(())
    }

    /// Socket address the HTTP API binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 8080,
            vlm: VlmConfig::default(),
            preprocess: PreprocessConfig::default(),
            capture_dir: None,
        }
    }
}
