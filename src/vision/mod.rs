// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for decorative ball inspection
//!
//! This module provides:
//! - Decoding of captured/uploaded stills and data URLs
//! - Preprocessing into bounded-size JPEG frames
//! - The grading rubric and the OpenAI-compatible VLM call
//! - Interpretation of the model's reply into a verdict

pub mod image_utils;
pub mod interpreter;
pub mod pipeline;
pub mod preprocess;
pub mod prompts;
pub mod service;
pub mod types;
pub mod vlm_client;

pub use image_utils::{decode_base64_image, decode_data_url, decode_image_bytes, ImageError};
pub use interpreter::{interpret_reply, FALLBACK_MESSAGE};
pub use pipeline::{FrameAnalyzer, VisionAnalyzer};
pub use preprocess::{preprocess, target_dimensions, PreprocessConfig};
pub use prompts::{build_analysis_request, RUBRIC_PROMPT};
pub use service::InferenceService;
pub use types::{AnalysisRequest, AnalysisVerdict, EncodedFrame, RawImage, ServiceError, VerdictStatus};
pub use vlm_client::{VlmClient, VlmConfig};
