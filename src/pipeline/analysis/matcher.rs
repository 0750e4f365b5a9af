use crate::models::{Rgb, MAX_RGB_DISTANCE};

use super::types::{CalibrationPoint, ColorMatch, ConfidenceModel};
use super::AnalysisError;

/// Distance at and beyond which the exponential model bottoms out.
const MAX_ACCEPTABLE_DISTANCE: f64 = 50.0;

/// Decay constant of the exponential model.
const DECAY_SCALE: f64 = 20.0;

/// Floor of the exponential model.
const MIN_DECAY_CONFIDENCE: f64 = 0.1;

/// Nearest calibration entry by Euclidean RGB distance.
///
/// Linear scan keeping the first strictly-smaller distance, so ties go to the
/// earlier (lower level) entry.
pub fn find_closest_match(color: &Rgb, table: &[CalibrationPoint]) -> Result<ColorMatch, AnalysisError> {
    let (first, rest) = table.split_first().ok_or(AnalysisError::EmptyCalibration)?;

    let mut best = ColorMatch {
        point: *first,
        distance: color.distance(&first.color),
    };
    for point in rest {
        let distance = color.distance(&point.color);
        if distance < best.distance {
            best = ColorMatch { point: *point, distance };
        }
    }

    Ok(best)
}

/// Confidence in [0, 1] for a match distance, rounded to two decimals.
pub fn confidence_score(distance: f64, model: ConfidenceModel) -> f64 {
    let raw = match model {
        ConfidenceModel::Linear => (1.0 - distance / MAX_RGB_DISTANCE).max(0.0),
        ConfidenceModel::ExponentialDecay => {
            if distance <= 0.0 {
                1.0
            } else if distance >= MAX_ACCEPTABLE_DISTANCE {
                MIN_DECAY_CONFIDENCE
            } else {
                (-distance / DECAY_SCALE).exp().max(MIN_DECAY_CONFIDENCE)
            }
        }
    };
    ((raw * 100.0).round() / 100.0).clamp(0.0, 1.0)
}
