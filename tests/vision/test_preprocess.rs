// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Preprocessing tests: bounded resize and JPEG re-encoding of raw stills

use ball_qc::vision::{preprocess, target_dimensions, ImageError, PreprocessConfig, RawImage};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

fn raw_png(width: u32, height: u32) -> RawImage {
    RawImage::decode(encode(&DynamicImage::new_rgb8(width, height), ImageFormat::Png)).unwrap()
}

fn decode_frame(base64: &str) -> DynamicImage {
    let bytes = STANDARD.decode(base64).unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        ImageFormat::Jpeg,
        "frames are always re-encoded as JPEG"
    );
    image::load_from_memory(&bytes).unwrap()
}

#[test]
fn test_landscape_photo_scaled_to_width() {
    let frame = preprocess(&raw_png(1600, 900), &PreprocessConfig::default()).unwrap();

    assert_eq!((frame.width, frame.height), (800, 450));
    assert_eq!(frame.mime_type, "image/jpeg");
    assert_eq!(decode_frame(&frame.base64).dimensions(), (800, 450));
}

#[test]
fn test_portrait_photo_scaled_to_height() {
    let frame = preprocess(&raw_png(1080, 1920), &PreprocessConfig::default()).unwrap();

    assert_eq!((frame.width, frame.height), (338, 600));
    assert_eq!(decode_frame(&frame.base64).dimensions(), (338, 600));
}

#[test]
fn test_small_photo_keeps_size() {
    let frame = preprocess(&raw_png(640, 480), &PreprocessConfig::default()).unwrap();

    assert_eq!((frame.width, frame.height), (640, 480));
    assert_eq!(decode_frame(&frame.base64).dimensions(), (640, 480));
}

#[test]
fn test_jpeg_upload_re_encoded() {
    let jpeg = encode(&DynamicImage::new_rgb8(1200, 700), ImageFormat::Jpeg);
    let raw = RawImage::decode(jpeg).unwrap();
    assert_eq!(raw.format, ImageFormat::Jpeg);

    let frame = preprocess(&raw, &PreprocessConfig::default()).unwrap();
    assert_eq!((frame.width, frame.height), (800, 467));
    assert!(frame.to_data_url().starts_with("data:image/jpeg;base64,"));
}

#[test]
fn test_transparent_png_flattened() {
    let mut img = RgbaImage::new(40, 30);
    for pixel in img.pixels_mut() {
        *pixel = Rgba([200, 30, 30, 0]);
    }
    let raw = RawImage::decode(encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png)).unwrap();

    let frame = preprocess(&raw, &PreprocessConfig::default()).unwrap();
    let decoded = decode_frame(&frame.base64);
    assert_eq!(decoded.dimensions(), (40, 30));
    assert!(!decoded.color().has_alpha());
}

#[test]
fn test_custom_bounds() {
    let config = PreprocessConfig {
        max_width: 320,
        max_height: 240,
    };
    let frame = preprocess(&raw_png(1280, 960), &config).unwrap();
    assert_eq!((frame.width, frame.height), (320, 240));
}

#[test]
fn test_output_never_exceeds_bounds() {
    let config = PreprocessConfig::default();
    let sizes = [
        (1, 1),
        (801, 1),
        (1, 601),
        (800, 600),
        (801, 601),
        (4000, 3000),
        (3000, 4000),
        (1000, 999),
        (999, 1000),
        (5000, 10),
        (10, 5000),
    ];

    for (w, h) in sizes {
        let (tw, th) = target_dimensions(w, h, &config);
        assert!(tw >= 1 && th >= 1, "{}x{} gave {}x{}", w, h, tw, th);
        assert!(tw <= config.max_width, "{}x{} gave {}x{}", w, h, tw, th);
        assert!(th <= config.max_height, "{}x{} gave {}x{}", w, h, tw, th);
        assert!(tw <= w && th <= h, "{}x{} was upscaled to {}x{}", w, h, tw, th);
    }
}

#[test]
fn test_truncated_image_rejected() {
    let mut bytes = encode(&DynamicImage::new_rgb8(64, 64), ImageFormat::Png);
    bytes.truncate(20);

    let err = RawImage::decode(bytes).unwrap_err();
    assert!(matches!(err, ImageError::DecodeFailed(_)), "got {:?}", err);
}

#[test]
fn test_text_file_rejected() {
    let err = RawImage::decode(b"this is not an image".to_vec()).unwrap_err();
    assert!(matches!(err, ImageError::UnsupportedFormat), "got {:?}", err);
}
