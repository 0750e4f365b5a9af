//! Synthetic reference strips.
//!
//! A reference strip is a 200x50 white card with a 50x20 reactive zone in the
//! middle, painted in the calibration color of one level and outlined in light
//! grey. Feeding one back through the analyzer must give its own level.

use std::collections::BTreeMap;

use image::{Rgba, RgbaImage};
use rand::Rng;
use tracing::warn;

use crate::models::Rgb;

use super::calibration::calibration_point;
use super::intake::encode_png_data_url;
use super::AnalysisError;

pub const STRIP_WIDTH: u32 = 200;
pub const STRIP_HEIGHT: u32 = 50;

const ZONE_X: u32 = 75;
const ZONE_Y: u32 = 15;
const ZONE_WIDTH: u32 = 50;
const ZONE_HEIGHT: u32 = 20;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BORDER: Rgba<u8> = Rgba([0xCC, 0xCC, 0xCC, 255]);

/// Preset shown in demo mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoLevel {
    pub level: u32,
    pub label: &'static str,
    pub description: &'static str,
}

pub const DEMO_LEVELS: [DemoLevel; 4] = [
    DemoLevel {
        level: 160,
        label: "Normal",
        description: "Normal cholesterol - Excellent for cardiovascular health",
    },
    DemoLevel {
        level: 200,
        label: "Borderline",
        description: "Borderline cholesterol - Monitoring recommended",
    },
    DemoLevel {
        level: 260,
        label: "High",
        description: "High cholesterol - Medical consultation advised",
    },
    DemoLevel {
        level: 300,
        label: "Critical",
        description: "Critical cholesterol - Urgent medical attention",
    },
];

pub fn demo_level(level: u32) -> Option<&'static DemoLevel> {
    DEMO_LEVELS.iter().find(|d| d.level == level)
}

/// Paint the reference strip raster for `level`.
pub fn render_reference_strip(level: u32) -> Result<RgbaImage, AnalysisError> {
    let point = calibration_point(level).ok_or(AnalysisError::UnsupportedLevel(level))?;
    Ok(paint_strip(point.color))
}

/// Reference strip for `level` as a PNG data URL.
pub fn generate_reference_image(level: u32) -> Result<String, AnalysisError> {
    encode_png_data_url(&render_reference_strip(level)?)
}

/// Reference strips for every calibration level. Levels that fail to render
/// are logged and skipped.
pub fn generate_all_references() -> BTreeMap<u32, String> {
    let mut references = BTreeMap::new();
    for level in super::calibration::supported_levels() {
        match generate_reference_image(level) {
            Ok(url) => {
                references.insert(level, url);
            }
            Err(e) => warn!(level, error = %e, "Failed to generate reference strip"),
        }
    }
    references
}

/// Reference strip with every channel of every pixel jittered uniformly by
/// up to `noise`, approximating sensor noise on a real capture.
pub fn simulate_capture<R: Rng + ?Sized>(
    level: u32,
    noise: u8,
    rng: &mut R,
) -> Result<RgbaImage, AnalysisError> {
    let mut strip = render_reference_strip(level)?;
    if noise == 0 {
        return Ok(strip);
    }

    let amplitude = i16::from(noise);
    for pixel in strip.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let jitter = rng.gen_range(-amplitude..=amplitude);
            *channel = (i16::from(*channel) + jitter).clamp(0, 255) as u8;
        }
    }
    Ok(strip)
}

fn paint_strip(zone: Rgb) -> RgbaImage {
    let mut strip = RgbaImage::from_pixel(STRIP_WIDTH, STRIP_HEIGHT, BACKGROUND);
    let fill = Rgba([zone.r, zone.g, zone.b, 255]);

    for y in ZONE_Y..ZONE_Y + ZONE_HEIGHT {
        for x in ZONE_X..ZONE_X + ZONE_WIDTH {
            let on_edge = x == ZONE_X
                || x == ZONE_X + ZONE_WIDTH - 1
                || y == ZONE_Y
                || y == ZONE_Y + ZONE_HEIGHT - 1;
            strip.put_pixel(x, y, if on_edge { BORDER } else { fill });
        }
    }
    strip
}
