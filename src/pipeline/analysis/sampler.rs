//! Center-region sampling of the reactive strip zone.
//!
//! The strip is framed so its reactive zone sits in the middle of the shot.
//! We crop the central 20% x 20% rectangle and average its color, ignoring
//! transparent pixels and (in the primary sampler) pixels too bright or too
//! dark to be dye: glare, specular highlights, shadow edges.

use image::RgbaImage;
use tracing::debug;

use crate::models::Rgb;

use super::types::AnalysisConfig;
use super::AnalysisError;

// ═══════════════════════════════════════════════════════════
// Region extraction
// ═══════════════════════════════════════════════════════════

/// Pixel rectangle inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the centered region covering `fraction` of each dimension.
///
/// `fraction` is clamped to [0, 1]; NaN yields an empty region.
pub fn center_region(width: u32, height: u32, fraction: f64, min_side: u32) -> Result<Region, AnalysisError> {
    let fraction = fraction.clamp(0.0, 1.0);
    let region_w = (f64::from(width) * fraction).floor() as u32;
    let region_h = (f64::from(height) * fraction).floor() as u32;

    if region_w < min_side || region_h < min_side {
        return Err(AnalysisError::RegionTooSmall {
            width: region_w,
            height: region_h,
            min: min_side,
        });
    }

    Ok(Region {
        x: (width - region_w) / 2,
        y: (height - region_h) / 2,
        width: region_w,
        height: region_h,
    })
}

/// Copy the central region out of `image`.
pub fn extract_center_region(image: &RgbaImage, config: &AnalysisConfig) -> Result<RgbaImage, AnalysisError> {
    let region = center_region(
        image.width(),
        image.height(),
        config.region_fraction,
        config.min_region_side,
    )?;

    debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "Center region extracted"
    );

    Ok(RgbaImage::from_fn(region.width, region.height, |dx, dy| {
        *image.get_pixel(region.x + dx, region.y + dy)
    }))
}

// ═══════════════════════════════════════════════════════════
// Samplers
// ═══════════════════════════════════════════════════════════

/// Reduces a region to a single representative color.
pub trait ColorSampler: Send + Sync {
    fn average_color(&self, region: &RgbaImage) -> Result<Rgb, AnalysisError>;

    fn name(&self) -> &'static str;
}

/// Primary sampler: opacity filter plus a luma band.
#[derive(Debug, Clone)]
pub struct FilteredSampler {
    pub alpha_threshold: u8,
    pub min_luma: f64,
    pub max_luma: f64,
}

impl FilteredSampler {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            alpha_threshold: config.alpha_threshold,
            min_luma: config.min_luma,
            max_luma: config.max_luma,
        }
    }
}

impl Default for FilteredSampler {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ColorSampler for FilteredSampler {
    fn average_color(&self, region: &RgbaImage) -> Result<Rgb, AnalysisError> {
        average_where(region, |p| {
            if p[3] < self.alpha_threshold {
                return false;
            }
            let luma = Rgb::new(p[0], p[1], p[2]).luma();
            luma >= self.min_luma && luma <= self.max_luma
        })
    }

    fn name(&self) -> &'static str {
        "filtered"
    }
}

/// Fallback sampler: opacity filter only.
#[derive(Debug, Clone)]
pub struct OpacitySampler {
    pub alpha_threshold: u8,
}

impl Default for OpacitySampler {
    fn default() -> Self {
        Self {
            alpha_threshold: AnalysisConfig::default().alpha_threshold,
        }
    }
}

impl ColorSampler for OpacitySampler {
    fn average_color(&self, region: &RgbaImage) -> Result<Rgb, AnalysisError> {
        average_where(region, |p| p[3] >= self.alpha_threshold)
    }

    fn name(&self) -> &'static str {
        "opacity"
    }
}

/// Per-channel rounded mean over the pixels accepted by `keep`.
fn average_where<F>(region: &RgbaImage, keep: F) -> Result<Rgb, AnalysisError>
where
    F: Fn(&[u8; 4]) -> bool,
{
    let (mut total_r, mut total_g, mut total_b) = (0u64, 0u64, 0u64);
    let mut valid = 0u64;

    for pixel in region.pixels() {
        if !keep(&pixel.0) {
            continue;
        }
        total_r += u64::from(pixel.0[0]);
        total_g += u64::from(pixel.0[1]);
        total_b += u64::from(pixel.0[2]);
        valid += 1;
    }

    if valid == 0 {
        return Err(AnalysisError::NoValidPixels);
    }

    let mean = |total: u64| (total as f64 / valid as f64).round() as u8;
    Ok(Rgb::new(mean(total_r), mean(total_g), mean(total_b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn region_is_centered_twenty_percent() {
        let region = center_region(200, 50, 0.2, 10).unwrap();
        assert_eq!(region, Region { x: 80, y: 20, width: 40, height: 10 });
    }

    #[test]
    fn region_floors_odd_sizes() {
        let region = center_region(101, 77, 0.2, 10).unwrap();
        assert_eq!(region.width, 20);
        assert_eq!(region.height, 15);
        assert_eq!(region.x, 40);
        assert_eq!(region.y, 31);
    }

    #[test]
    fn region_too_small_is_size_error() {
        let err = center_region(49, 200, 0.2, 10).unwrap_err();
        assert!(matches!(err, AnalysisError::RegionTooSmall { width: 9, height: 40, min: 10 }));
        assert!(center_region(50, 50, 0.2, 10).is_ok());
    }

    #[test]
    fn fraction_outside_unit_range_is_clamped() {
        let full = center_region(100, 80, 1.5, 10).unwrap();
        assert_eq!(full, Region { x: 0, y: 0, width: 100, height: 80 });

        let err = center_region(100, 80, -0.5, 10).unwrap_err();
        assert!(matches!(err, AnalysisError::RegionTooSmall { width: 0, height: 0, .. }));
        assert!(center_region(100, 80, f64::NAN, 10).is_err());
    }

    #[test]
    fn extract_copies_center_pixels_only() {
        let mut img = solid(100, 100, [255, 0, 0, 255]);
        for y in 40..60 {
            for x in 40..60 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let region = extract_center_region(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(region.dimensions(), (20, 20));
        assert!(region.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn average_of_uniform_region() {
        let color = FilteredSampler::default()
            .average_color(&solid(20, 20, [196, 154, 107, 255]))
            .unwrap();
        assert_eq!(color, Rgb::new(196, 154, 107));
    }

    #[test]
    fn average_rounds_to_nearest() {
        let mut img = solid(2, 1, [100, 100, 100, 255]);
        img.put_pixel(1, 0, Rgba([101, 102, 100, 255]));
        let color = OpacitySampler::default().average_color(&img).unwrap();
        // 100.5 rounds up, 101 exact, 100 exact
        assert_eq!(color, Rgb::new(101, 101, 100));
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let mut img = solid(10, 10, [0, 0, 0, 0]);
        img.put_pixel(3, 3, Rgba([150, 120, 90, 255]));
        let color = OpacitySampler::default().average_color(&img).unwrap();
        assert_eq!(color, Rgb::new(150, 120, 90));
    }

    #[test]
    fn glare_pixels_are_skipped_by_primary() {
        let mut img = solid(10, 10, [184, 134, 79, 255]);
        for x in 0..10 {
            img.put_pixel(x, 0, Rgba([255, 255, 255, 255]));
            img.put_pixel(x, 9, Rgba([5, 5, 5, 255]));
        }
        let filtered = FilteredSampler::default().average_color(&img).unwrap();
        assert_eq!(filtered, Rgb::new(184, 134, 79));

        let unfiltered = OpacitySampler::default().average_color(&img).unwrap();
        assert_ne!(unfiltered, filtered);
    }

    #[test]
    fn all_filtered_is_no_valid_pixels() {
        let white = solid(10, 10, [255, 255, 255, 255]);
        let err = FilteredSampler::default().average_color(&white).unwrap_err();
        assert!(err.is_no_signal());

        let clear = solid(10, 10, [80, 80, 80, 10]);
        assert!(OpacitySampler::default().average_color(&clear).is_err());
    }

    #[test]
    fn opacity_sampler_accepts_glare() {
        let white = solid(10, 10, [255, 255, 255, 255]);
        let color = OpacitySampler::default().average_color(&white).unwrap();
        assert_eq!(color, Rgb::new(255, 255, 255));
    }
}
