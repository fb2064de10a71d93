// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persistence of captured frames

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Write-only sink for captured stills
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Decode `base64_payload` and store it under `filename`.
    /// Returns the location written.
    async fn save(&self, base64_payload: &str, filename: &str) -> Result<PathBuf, StoreError>;
}

/// Stores images as files in one directory, created on first write
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, base64_payload: &str, filename: &str) -> Result<PathBuf, StoreError> {
        // Only a bare file name is accepted, no path components
        let name = Path::new(filename)
            .file_name()
            .filter(|n| n.to_str() == Some(filename))
            .ok_or_else(|| StoreError::InvalidFilename(filename.to_string()))?;

        let bytes = STANDARD.decode(base64_payload.trim())?;
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        tokio::fs::write(&path, &bytes).await?;
        info!("Image saved: {}", path.display());
        Ok(path)
    }
}

/// Unique, time-ordered file name for a captured frame
pub fn capture_filename(extension: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "ball_{}_{}.{}",
        Utc::now().format("%Y%m%dT%H%M%S%.3fZ"),
        &id[..8],
        extension
    )
}
