//! Image intake: embedded data URLs in, decoded RGBA rasters out.
//!
//! Captured photos and generated swatches both travel as
//! `data:image/<type>;base64,<payload>` strings. The string is what gets stored
//! with a result, so the intake validates it up front and rejects anything the
//! sampler cannot use.

use std::io::Cursor;

use base64::Engine as _;
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use tracing::debug;

use super::AnalysisError;

/// Maximum decoded payload size before rejecting.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

const DATA_URL_PREFIX: &str = "data:image/";

pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// A parsed `data:` URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Parse and validate an embedded-image string.
pub fn parse_data_url(input: &str) -> Result<DataUrl, AnalysisError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AnalysisError::InvalidInput("missing image data".into()));
    }
    if !input.starts_with(DATA_URL_PREFIX) {
        return Err(AnalysisError::InvalidInput("invalid data URL format".into()));
    }

    let (header, payload) = input
        .split_once(',')
        .ok_or_else(|| AnalysisError::InvalidInput("data URL has no payload".into()))?;

    // header = "data:image/png;base64"
    let meta = &header["data:".len()..];
    let media_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| AnalysisError::InvalidInput("data URL is not base64 encoded".into()))?
        .to_ascii_lowercase();

    if !SUPPORTED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(AnalysisError::UnsupportedMediaType(media_type));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AnalysisError::InvalidInput(format!("invalid base64 payload: {e}")))?;
    validate_image_bytes(&bytes)?;

    Ok(DataUrl { media_type, bytes })
}

/// Size bounds on the decoded payload.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), AnalysisError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(AnalysisError::InvalidInput(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AnalysisError::InvalidInput(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Read the raster dimensions from the image header without decoding pixels.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), AnalysisError> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| header_error(&e))?
        .into_dimensions()
        .map_err(|e| header_error(&e))
}

fn header_error(e: &dyn std::fmt::Display) -> AnalysisError {
    AnalysisError::ImageProcessing(format!("Failed to decode image header: {e}"))
}

/// Decode image bytes to RGBA, rejecting oversized rasters.
///
/// The size check runs on the header, before any pixel buffer is allocated.
pub fn decode_image(bytes: &[u8], max_dimension: u32) -> Result<RgbaImage, AnalysisError> {
    let (width, height) = image_dimensions(bytes)?;
    if width > max_dimension || height > max_dimension {
        return Err(AnalysisError::ImageTooLarge {
            width,
            height,
            max: max_dimension,
        });
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::ImageProcessing(format!("Failed to decode image: {e}")))?;
    let rgba = img.to_rgba8();

    debug!(width, height, "Image decoded for analysis");
    Ok(rgba)
}

/// Detect the media type from magic bytes (NOT file extensions).
pub fn detect_media_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        _ => None,
    }
}

/// Wrap raw PNG/JPEG bytes (e.g. a photo read from disk) as a data URL.
pub fn data_url_from_bytes(bytes: &[u8]) -> Result<String, AnalysisError> {
    let media_type = detect_media_type(bytes).ok_or_else(|| {
        AnalysisError::UnsupportedMediaType("unrecognized image signature".into())
    })?;
    validate_image_bytes(bytes)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{media_type};base64,{encoded}"))
}

/// Encode an RGBA raster as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, AnalysisError> {
    let dynamic = DynamicImage::ImageRgba8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| AnalysisError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

/// Encode an RGBA raster as a PNG data URL.
pub fn encode_png_data_url(img: &RgbaImage) -> Result<String, AnalysisError> {
    let png = encode_png(img)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("data:image/png;base64,{encoded}"))
}
