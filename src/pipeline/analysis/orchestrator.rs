use image::RgbaImage;

use crate::models::{Rgb, TestResult};

use super::calibration::CALIBRATION_TABLE;
use super::classify::classify;
use super::intake::{decode_image, parse_data_url};
use super::matcher::{confidence_score, find_closest_match};
use super::sampler::{extract_center_region, ColorSampler, FilteredSampler, OpacitySampler};
use super::types::{AnalysisConfig, CalibrationPoint, ConfidenceModel, StripAnalysis};
use super::AnalysisError;

/// Turns a strip image into a [`TestResult`].
///
/// Sampling goes through trait objects so the primary and fallback strategies
/// can be swapped independently. The fallback runs at most once, and only
/// when the primary sampler rejected every pixel of the region.
pub struct StripAnalyzer {
    primary: Box<dyn ColorSampler>,
    fallback: Option<Box<dyn ColorSampler>>,
    table: &'static [CalibrationPoint],
    config: AnalysisConfig,
}

impl StripAnalyzer {
    pub fn new(
        primary: Box<dyn ColorSampler>,
        fallback: Option<Box<dyn ColorSampler>>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            table: &CALIBRATION_TABLE,
            config,
        }
    }

    /// Filtered primary sampler with the opacity-only fallback.
    pub fn standard(config: AnalysisConfig) -> Self {
        let primary = Box::new(FilteredSampler::from_config(&config));
        let fallback = Box::new(OpacitySampler {
            alpha_threshold: config.alpha_threshold,
        });
        Self::new(primary, Some(fallback), config)
    }

    pub fn with_confidence_model(mut self, model: ConfidenceModel) -> Self {
        self.config.confidence_model = model;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze an embedded strip image. The input string becomes the
    /// result's `image_data`.
    pub fn analyze(&self, data_url: &str) -> Result<StripAnalysis, AnalysisError> {
        let parsed = parse_data_url(data_url)?;
        let image = decode_image(&parsed.bytes, self.config.max_image_dimension)?;
        self.analyze_image(&image, data_url.trim().to_string())
    }

    /// Analyze an already decoded raster.
    pub fn analyze_image(&self, image: &RgbaImage, image_data: String) -> Result<StripAnalysis, AnalysisError> {
        let (sampled_color, used_fallback) = self.sample(image)?;
        let matched = find_closest_match(&sampled_color, self.table)?;
        let confidence = confidence_score(matched.distance, self.config.confidence_model);
        let level = matched.point.level;

        tracing::info!(
            level,
            confidence,
            distance = matched.distance,
            sampled = %sampled_color.to_hex(),
            used_fallback,
            "Strip analyzed"
        );

        Ok(StripAnalysis {
            result: TestResult::new(level, classify(level), image_data, confidence),
            sampled_color,
            matched: matched.point,
            distance: matched.distance,
            used_fallback,
        })
    }

    /// Match a color directly, skipping image handling.
    pub fn analyze_color(&self, color: &Rgb) -> Result<(CalibrationPoint, f64), AnalysisError> {
        let matched = find_closest_match(color, self.table)?;
        Ok((matched.point, confidence_score(matched.distance, self.config.confidence_model)))
    }

    /// Whether `data_url` would make it through intake and sampling.
    pub fn validate_image_for_analysis(&self, data_url: &str) -> bool {
        let check = || -> Result<(), AnalysisError> {
            let parsed = parse_data_url(data_url)?;
            let image = decode_image(&parsed.bytes, self.config.max_image_dimension)?;
            self.sample(&image)?;
            Ok(())
        };
        match check() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Image rejected for analysis");
                false
            }
        }
    }

    fn sample(&self, image: &RgbaImage) -> Result<(Rgb, bool), AnalysisError> {
        let region = extract_center_region(image, &self.config)?;

        match self.primary.average_color(&region) {
            Ok(color) => Ok((color, false)),
            Err(e) if e.is_no_signal() => {
                let Some(fallback) = &self.fallback else {
                    return Err(e);
                };
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = fallback.name(),
                    "Primary sampler found no usable pixels, retrying with fallback"
                );
                let color = fallback.average_color(&region)?;
                Ok((color, true))
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for StripAnalyzer {
    fn default() -> Self {
        Self::standard(AnalysisConfig::default())
    }
}
