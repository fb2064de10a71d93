// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live camera source trait and a snapshot-file implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while activating a camera or grabbing a frame
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read frame: {0}")]
    Io(#[from] std::io::Error),
}

/// A live camera feed that can produce one still on demand
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Request the live feed. Called whenever the controller switches to
    /// live mode.
    async fn activate(&self) -> Result<(), CaptureError>;

    /// Grab the current frame as encoded image bytes
    async fn grab_frame(&self) -> Result<Vec<u8>, CaptureError>;
}

/// Camera backed by a snapshot file that an external capture process keeps
/// overwriting with the latest frame.
#[derive(Debug, Clone)]
pub struct FileCamera {
    snapshot_path: PathBuf,
}

impl FileCamera {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

#[async_trait]
impl CameraSource for FileCamera {
    async fn activate(&self) -> Result<(), CaptureError> {
        match tokio::fs::metadata(&self.snapshot_path).await {
            Ok(meta) if meta.is_file() => {
                info!("Camera feed active: {}", self.snapshot_path.display());
                Ok(())
            }
            Ok(_) => Err(CaptureError::Unavailable(format!(
                "{} is not a file",
                self.snapshot_path.display()
            ))),
            Err(e) => Err(CaptureError::Unavailable(format!(
                "{}: {}",
                self.snapshot_path.display(),
                e
            ))),
        }
    }

    async fn grab_frame(&self) -> Result<Vec<u8>, CaptureError> {
        let bytes = tokio::fs::read(&self.snapshot_path).await?;
        debug!(
            "Grabbed {} bytes from {}",
            bytes.len(),
            self.snapshot_path.display()
        );
        Ok(bytes)
    }
}
