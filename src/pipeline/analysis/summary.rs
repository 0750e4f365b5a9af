//! Human-readable interpretation of a finished analysis.

use serde::Serialize;

use crate::models::{ConfidenceLevel, TestResult};

use super::calibration::CALIBRATION_TABLE;
use super::classify::{classification_info, ClassificationInfo};
use super::types::ConfidenceModel;

pub mod thresholds {
    /// Confidence strictly above this reads as high.
    pub const HIGH_CONFIDENCE: f64 = 0.8;
    /// Confidence strictly above this (and not high) reads as medium.
    pub const MEDIUM_CONFIDENCE: f64 = 0.6;
    /// Below this a new photo is recommended.
    pub const RETAKE_BELOW: f64 = 0.5;
    /// Below this the result is flagged as low-confidence to the user.
    pub const ALERT_BELOW: f64 = 0.7;
}

pub const ANALYSIS_METHOD: &str = "RGB colorimetric matching";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalDetails {
    pub method: &'static str,
    pub calibration_points: usize,
    /// Only known right after scoring; stored results do not record it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_model: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub classification: ClassificationInfo,
    pub confidence_level: ConfidenceLevel,
    pub recommended_action: &'static str,
    pub needs_retake: bool,
    pub low_confidence_alert: bool,
    pub technical_details: TechnicalDetails,
}

pub fn confidence_level(confidence: f64) -> ConfidenceLevel {
    if confidence > thresholds::HIGH_CONFIDENCE {
        ConfidenceLevel::High
    } else if confidence > thresholds::MEDIUM_CONFIDENCE {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

impl AnalysisSummary {
    pub fn for_result(result: &TestResult) -> Self {
        let needs_retake = result.confidence < thresholds::RETAKE_BELOW;
        let recommended_action = if needs_retake {
            "Retake the photo in better lighting conditions"
        } else {
            "Result usable for tracking"
        };

        Self {
            classification: classification_info(result.classification),
            confidence_level: confidence_level(result.confidence),
            recommended_action,
            needs_retake,
            low_confidence_alert: result.confidence < thresholds::ALERT_BELOW,
            technical_details: TechnicalDetails {
                method: ANALYSIS_METHOD,
                calibration_points: CALIBRATION_TABLE.len(),
                confidence_model: None,
            },
        }
    }

    /// Record the model that produced the confidence score.
    pub fn with_confidence_model(mut self, model: ConfidenceModel) -> Self {
        self.technical_details.confidence_model = Some(model.as_str());
        self
    }
}
