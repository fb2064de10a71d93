// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and utility functions for ball inspection
//!
//! Handles the three ways a still reaches the pipeline: a data URL posted by
//! the UI, a bare base64 payload, or raw bytes read from a camera snapshot or
//! an uploaded file.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

use super::types::RawImage;

/// Maximum accepted source image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Errors raised while decoding or re-encoding a still image
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid image format: expected data:<mime>;base64,<payload>")]
    InvalidDataUrl,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Split a `data:<mime>;base64,<payload>` URL into its MIME type and payload.
///
/// The payload is everything after the first comma; it is not decoded here.
pub fn parse_data_url(data_url: &str) -> Result<(&str, &str), ImageError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(ImageError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageError::InvalidDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ImageError::InvalidDataUrl)?;

    if payload.is_empty() {
        return Err(ImageError::InvalidDataUrl);
    }

    Ok((mime, payload))
}

/// Decode a data URL into a [`RawImage`]
pub fn decode_data_url(data_url: &str) -> Result<RawImage, ImageError> {
    let (_mime, payload) = parse_data_url(data_url)?;
    decode_base64_image(payload)
}

/// Decode a base64-encoded image into a [`RawImage`]
///
/// # Example
/// ```ignore
/// let raw = decode_base64_image("iVBORw0KGgo...")?;
/// println!("Image size: {}x{}", raw.width, raw.height);
/// ```
pub fn decode_base64_image(base64_str: &str) -> Result<RawImage, ImageError> {
    if base64_str.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let bytes = STANDARD.decode(base64_str.trim())?;
    RawImage::decode(bytes)
}

/// Decode raw image bytes, returning the pixels and the detected format.
///
/// Empty and oversized buffers are rejected before any decoding work.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    let format = detect_format(bytes)?;
    let pixels = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    Ok((pixels, format))
}

/// Detect the format from magic bytes. Only formats a camera or photo
/// upload produces are accepted.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::WebP
        | ImageFormat::Gif
        | ImageFormat::Bmp)) => Ok(format),
        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// File extension used when persisting a frame of the given MIME type
pub fn mime_to_extension(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}
