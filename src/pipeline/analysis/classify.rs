use serde::Serialize;

use crate::models::Classification;

/// Values strictly below this are normal.
pub const HIGH_THRESHOLD: u32 = 170;

/// Values strictly above this are critical. The boundary itself is high.
pub const CRITICAL_THRESHOLD: u32 = 240;

/// Band for a cholesterol value (mg/dL). Total over all inputs.
pub fn classify(level: u32) -> Classification {
    if level < HIGH_THRESHOLD {
        Classification::Normal
    } else if level <= CRITICAL_THRESHOLD {
        Classification::High
    } else {
        Classification::Critical
    }
}

/// User-facing interpretation of a band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationInfo {
    pub level: Classification,
    /// Display color, `#RRGGBB`.
    pub color: &'static str,
    pub description: &'static str,
    pub advice: &'static str,
}

pub fn classification_info(level: Classification) -> ClassificationInfo {
    match level {
        Classification::Normal => ClassificationInfo {
            level,
            color: "#10B981",
            description: "Normal cholesterol",
            advice: "Excellent! Maintain a balanced diet and regular physical activity to keep this good level.",
        },
        Classification::High => ClassificationInfo {
            level,
            color: "#F59E0B",
            description: "High cholesterol",
            advice: "Attention: your cholesterol is high. Consult your doctor and adopt a diet low in saturated fats.",
        },
        Classification::Critical => ClassificationInfo {
            level,
            color: "#EF4444",
            description: "Critical cholesterol",
            advice: "URGENT: Consult your doctor immediately. This level requires rapid medical attention.",
        },
    }
}

pub fn classify_result(value: u32) -> ClassificationInfo {
    classification_info(classify(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(classify(169), Classification::Normal);
        assert_eq!(classify(170), Classification::High);
        assert_eq!(classify(240), Classification::High);
        assert_eq!(classify(241), Classification::Critical);
    }

    #[test]
    fn extremes() {
        assert_eq!(classify(0), Classification::Normal);
        assert_eq!(classify(u32::MAX), Classification::Critical);
    }

    #[test]
    fn calibration_levels_band() {
        let bands: Vec<Classification> = [140, 160, 180, 200, 220, 240, 260, 280, 300]
            .iter()
            .map(|l| classify(*l))
            .collect();
        use Classification::*;
        assert_eq!(bands, vec![Normal, Normal, High, High, High, High, Critical, Critical, Critical]);
    }

    #[test]
    fn info_matches_band() {
        let info = classify_result(250);
        assert_eq!(info.level, Classification::Critical);
        assert!(info.advice.starts_with("URGENT"));
        assert_eq!(classify_result(150).description, "Normal cholesterol");
    }
}
