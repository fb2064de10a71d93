// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for ball inspection

use std::fmt;

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image_utils::{decode_image_bytes, ImageError};

/// A still as captured or uploaded, decoded once and held until preprocessed
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    /// Decoded pixels
    pub pixels: DynamicImage,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Source format detected from the magic bytes
    pub format: ImageFormat,
}

impl RawImage {
    /// Decode encoded image bytes (PNG, JPEG, WebP, GIF, BMP).
    ///
    /// Fails with [`ImageError`] when the bytes are not a decodable image.
    pub fn decode(bytes: impl AsRef<[u8]>) -> Result<Self, ImageError> {
        let (pixels, format) = decode_image_bytes(bytes.as_ref())?;
        Ok(Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels,
            format,
        })
    }
}

/// A resized, re-encoded still ready to be embedded in an inference request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Base64 payload (no data URL prefix)
    pub base64: String,
    /// MIME type of the encoded payload
    pub mime_type: &'static str,
    /// Width in pixels after resizing
    pub width: u32,
    /// Height in pixels after resizing
    pub height: u32,
}

impl EncodedFrame {
    /// Render as a `data:<mime>;base64,<payload>` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// The rubric prompt paired with one frame. Immutable once built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    prompt: &'static str,
    frame: EncodedFrame,
}

impl AnalysisRequest {
    pub fn new(prompt: &'static str, frame: EncodedFrame) -> Self {
        Self { prompt, frame }
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn frame(&self) -> &EncodedFrame {
        &self.frame
    }
}

/// Outcome tag of one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Fail,
    NoBall,
    QualityError,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Pass => "pass",
            VerdictStatus::Fail => "fail",
            VerdictStatus::NoBall => "no_ball",
            VerdictStatus::QualityError => "quality_error",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of one analysis: `{ "status": ..., "message": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub status: VerdictStatus,
    pub message: String,
}

impl AnalysisVerdict {
    pub fn new(status: VerdictStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn quality_error(message: impl Into<String>) -> Self {
        Self::new(VerdictStatus::QualityError, message)
    }
}

/// Errors raised by the inference service call
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced an HTTP response
    #[error("Inference transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Inference timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The service answered with a non-success status
    #[error("Inference API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service answered but the body could not be read
    #[error("Invalid inference response: {0}")]
    InvalidResponse(String),

    /// The service answered with no reply text
    #[error("Inference service returned an empty reply")]
    EmptyReply,

    /// No inference service is configured
    #[error("Inference service not available")]
    NotConfigured,
}
