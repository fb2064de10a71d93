// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame preprocessing: bound the dimensions of a captured still and
//! re-encode it as JPEG for the vision request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

use super::image_utils::ImageError;
use super::types::{EncodedFrame, RawImage};

/// Default maximum frame width sent to the vision service
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Default maximum frame height sent to the vision service
pub const DEFAULT_MAX_HEIGHT: u32 = 600;

/// MIME type of every encoded frame
pub const FRAME_MIME_TYPE: &str = "image/jpeg";

/// Dimension bounds applied before encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// Compute the output dimensions for a `width` x `height` source.
///
/// Landscape and square sources are scaled against the width bound, portrait
/// sources against the height bound. If the other axis still exceeds its
/// bound afterwards it is scaled down as well, so the result never exceeds
/// either maximum. Sources already within bounds are returned unchanged.
pub fn target_dimensions(width: u32, height: u32, config: &PreprocessConfig) -> (u32, u32) {
    let max_w = config.max_width as f64;
    let max_h = config.max_height as f64;
    let (mut w, mut h) = (width as f64, height as f64);

    if w >= h {
        if w > max_w {
            h *= max_w / w;
            w = max_w;
        }
    } else if h > max_h {
        w *= max_h / h;
        h = max_h;
    }

    if h > max_h {
        w *= max_h / h;
        h = max_h;
    }
    if w > max_w {
        h *= max_w / w;
        w = max_w;
    }

    (round_dimension(w), round_dimension(h))
}

fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Resize and re-encode a raw still into an [`EncodedFrame`].
///
/// # Errors
/// [`ImageError::EncodeFailed`] when the resized image cannot be encoded.
/// Nothing is sent anywhere on failure.
pub fn preprocess(raw: &RawImage, config: &PreprocessConfig) -> Result<EncodedFrame, ImageError> {
    let (width, height) = target_dimensions(raw.width, raw.height, config);
    let jpeg_bytes = if (width, height) == (raw.width, raw.height) {
        encode_to_jpeg(&raw.pixels)?
    } else {
        encode_to_jpeg(&raw.pixels.resize_exact(width, height, FilterType::Triangle))?
    };
    debug!(
        "Preprocessed frame {}x{} -> {}x{} ({} JPEG bytes)",
        raw.width,
        raw.height,
        width,
        height,
        jpeg_bytes.len()
    );

    Ok(EncodedFrame {
        base64: STANDARD.encode(&jpeg_bytes),
        mime_type: FRAME_MIME_TYPE,
        width,
        height,
    })
}

/// Encode to JPEG at the encoder's default quality. Alpha is dropped.
fn encode_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}
