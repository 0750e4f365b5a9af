//! Color to cholesterol correspondence table for the reactive strip zone.

use crate::models::Rgb;

use super::types::CalibrationPoint;

/// Calibrated reference colors, ordered by ascending level.
pub const CALIBRATION_TABLE: [CalibrationPoint; 9] = [
    CalibrationPoint { color: Rgb::new(245, 230, 211), level: 140, label: "Optimal" },
    CalibrationPoint { color: Rgb::new(232, 213, 183), level: 160, label: "Normal" },
    CalibrationPoint { color: Rgb::new(212, 184, 150), level: 180, label: "Normal high" },
    CalibrationPoint { color: Rgb::new(196, 154, 107), level: 200, label: "Borderline" },
    CalibrationPoint { color: Rgb::new(184, 134, 79), level: 220, label: "High" },
    CalibrationPoint { color: Rgb::new(166, 124, 82), level: 240, label: "High" },
    CalibrationPoint { color: Rgb::new(139, 111, 71), level: 260, label: "Very high" },
    CalibrationPoint { color: Rgb::new(122, 95, 60), level: 280, label: "Very high" },
    CalibrationPoint { color: Rgb::new(107, 78, 49), level: 300, label: "Critical" },
];

pub fn calibration_point(level: u32) -> Option<&'static CalibrationPoint> {
    CALIBRATION_TABLE.iter().find(|p| p.level == level)
}

pub fn supported_levels() -> Vec<u32> {
    CALIBRATION_TABLE.iter().map(|p| p.level).collect()
}

pub fn is_level_supported(level: u32) -> bool {
    calibration_point(level).is_some()
}

pub fn level_description(level: u32) -> &'static str {
    calibration_point(level).map_or("Unknown level", |p| p.label)
}

pub fn rgb_for_level(level: u32) -> Option<Rgb> {
    calibration_point(level).map(|p| p.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_spans_140_to_300_ascending() {
        let levels = supported_levels();
        assert_eq!(levels.first(), Some(&140));
        assert_eq!(levels.last(), Some(&300));
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn colors_darken_with_level() {
        let lumas: Vec<f64> = CALIBRATION_TABLE.iter().map(|p| p.color.luma()).collect();
        assert!(lumas.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn every_color_sits_inside_the_brightness_band() {
        for point in &CALIBRATION_TABLE {
            let luma = point.color.luma();
            assert!((30.0..=240.0).contains(&luma), "{} has luma {luma}", point.level);
        }
    }

    #[test]
    fn lookups() {
        assert!(is_level_supported(200));
        assert!(!is_level_supported(210));
        assert_eq!(level_description(200), "Borderline");
        assert_eq!(level_description(999), "Unknown level");
        assert_eq!(rgb_for_level(300), Some(Rgb::new(107, 78, 49)));
        assert_eq!(rgb_for_level(150), None);
    }
}
