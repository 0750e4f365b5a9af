use serde::Serialize;

use crate::models::{Rgb, TestResult};

/// Reference (color, level) pair used for nearest-neighbor matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationPoint {
    pub color: Rgb,
    /// mg/dL
    pub level: u32,
    pub label: &'static str,
}

/// How a match distance is turned into a [0, 1] confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceModel {
    /// `1 - d / MAX_RGB_DISTANCE`, floored at 0.
    #[default]
    Linear,
    /// `exp(-d / 20)` floored at 0.1; 1.0 on exact match, 0.1 from d = 50.
    ExponentialDecay,
}

impl ConfidenceModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::ExponentialDecay => "exponential",
        }
    }
}

/// Tunables for the analysis pipeline. `Default` holds the production values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Share of width and height covered by the sampled center region.
    pub region_fraction: f64,
    /// Smallest accepted region side, in pixels.
    pub min_region_side: u32,
    /// Pixels with alpha below this are treated as transparent.
    pub alpha_threshold: u8,
    /// Luma band kept by the primary sampler (glare and shadow rejection).
    pub min_luma: f64,
    pub max_luma: f64,
    /// Largest accepted image side, in pixels.
    pub max_image_dimension: u32,
    pub confidence_model: ConfidenceModel,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            region_fraction: 0.2,
            min_region_side: 10,
            alpha_threshold: 128,
            min_luma: 30.0,
            max_luma: 240.0,
            max_image_dimension: 4000,
            confidence_model: ConfidenceModel::Linear,
        }
    }
}

/// Nearest calibration entry for a sampled color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorMatch {
    pub point: CalibrationPoint,
    pub distance: f64,
}

/// Full outcome of one strip analysis.
#[derive(Debug, Clone, Serialize)]
pub struct StripAnalysis {
    pub result: TestResult,
    pub sampled_color: Rgb,
    pub matched: CalibrationPoint,
    pub distance: f64,
    /// True when the primary sampler found no usable pixels and the
    /// opacity-only sampler produced the color instead.
    pub used_fallback: bool,
}
