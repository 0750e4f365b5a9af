//! Analysis commands: analyze a strip, render reference strips, list levels.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::pipeline::analysis::{
    calibration_point, classify, data_url_from_bytes, demo_level, encode_png, simulate_capture,
    AnalysisSummary, ConfidenceModel, CALIBRATION_TABLE,
};

use super::{write_atomically, AppState, CommandOutput, ResultView};

const DATA_URL_PREFIX: &[u8] = b"data:image/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeView {
    pub result: ResultView,
    pub sampled_color: String,
    pub matched_label: &'static str,
    pub distance: f64,
    pub used_fallback: bool,
    pub saved: bool,
    pub summary: AnalysisSummary,
}

/// Read an image file as a data URL. Accepts raw PNG/JPEG bytes or a text
/// file that already holds a `data:image/...` URL.
pub fn load_image_as_data_url(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    if bytes.starts_with(DATA_URL_PREFIX) {
        let text = String::from_utf8(bytes).map_err(|e| format!("Data URL is not UTF-8: {e}"))?;
        return Ok(text.trim().to_string());
    }
    data_url_from_bytes(&bytes).map_err(|e| e.to_string())
}

/// Analyze a strip image and, unless `save` is false, record the result.
/// A failed save is logged and reported in the output, not treated as an
/// analysis failure.
pub fn analyze_strip(
    state: &AppState,
    image: &Path,
    save: bool,
    model: ConfidenceModel,
) -> Result<CommandOutput, String> {
    let data_url = load_image_as_data_url(image)?;
    let analysis = state
        .analyzer(model)
        .analyze(&data_url)
        .map_err(|e| format!("Analysis failed: {e}"))?;

    let saved = save
        && match state.store.save(analysis.result.clone()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, id = %analysis.result.id, "Failed to save test result");
                false
            }
        };

    let summary = AnalysisSummary::for_result(&analysis.result).with_confidence_model(model);
    let view = AnalyzeView {
        result: ResultView::from(&analysis.result),
        sampled_color: analysis.sampled_color.to_hex(),
        matched_label: analysis.matched.label,
        distance: (analysis.distance * 100.0).round() / 100.0,
        used_fallback: analysis.used_fallback,
        saved,
        summary,
    };

    let mut text = format!(
        "Cholesterol: {} mg/dL ({})\n{}\nConfidence: {:.0}% ({})\nSampled color: {} -> {} ({})\n{}",
        view.result.cholesterol_value,
        view.summary.classification.description,
        view.summary.classification.advice,
        view.result.confidence * 100.0,
        view.summary.confidence_level,
        view.sampled_color,
        view.matched_label,
        view.result.cholesterol_value,
        view.summary.recommended_action,
    );
    if view.summary.low_confidence_alert {
        text.push_str("\nLow confidence: the strip color did not match a reference closely.");
    }
    if view.used_fallback {
        text.push_str("\nNote: glare or shadow filtering removed every pixel; unfiltered average used.");
    }
    if save {
        text.push_str(if saved {
            "\nSaved to history."
        } else {
            "\nWarning: result could not be saved."
        });
    }
    text.push_str(&format!("\nID: {}", view.result.id));

    CommandOutput::new(text, &view)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceView {
    pub level: u32,
    pub label: &'static str,
    pub color: String,
    pub noise: u8,
    pub path: String,
}

/// Write the reference strip for `level` as a PNG, optionally with
/// simulated capture noise.
pub fn write_reference(level: u32, output: &Path, noise: u8, seed: Option<u64>) -> Result<CommandOutput, String> {
    let point = calibration_point(level).ok_or_else(|| {
        format!("Unsupported cholesterol level: {level} (see `ownbioscan levels`)")
    })?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let strip = simulate_capture(level, noise, &mut rng).map_err(|e| e.to_string())?;
    let png = encode_png(&strip).map_err(|e| e.to_string())?;
    write_atomically(output, &png)?;

    tracing::info!(level, noise, path = %output.display(), "Reference strip written");

    let view = ReferenceView {
        level,
        label: point.label,
        color: point.color.to_hex(),
        noise,
        path: output.display().to_string(),
    };
    let text = format!(
        "Wrote {} mg/dL reference strip ({}, {}) to {}",
        level, view.label, view.color, view.path
    );
    CommandOutput::new(text, &view)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelView {
    pub level: u32,
    pub label: &'static str,
    pub color: String,
    pub classification: crate::models::Classification,
    pub demo: Option<&'static str>,
}

pub fn list_levels() -> Result<CommandOutput, String> {
    let levels: Vec<LevelView> = CALIBRATION_TABLE
        .iter()
        .map(|p| LevelView {
            level: p.level,
            label: p.label,
            color: p.color.to_hex(),
            classification: classify(p.level),
            demo: demo_level(p.level).map(|d| d.label),
        })
        .collect();

    let text = levels
        .iter()
        .map(|l| {
            let demo = l.demo.map(|d| format!("  [demo: {d}]")).unwrap_or_default();
            format!(
                "{:>3} mg/dL  {}  {:<12} {}{}",
                l.level,
                l.color,
                l.label,
                l.classification.as_str(),
                demo
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    CommandOutput::new(text, &levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;
    use crate::pipeline::analysis::{generate_reference_image, render_reference_strip};

    #[test]
    fn analyze_saves_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.png");
        std::fs::write(&path, encode_png(&render_reference_strip(260).unwrap()).unwrap()).unwrap();

        let state = AppState::in_memory();
        let out = analyze_strip(&state, &path, true, ConfidenceModel::Linear).unwrap();
        assert_eq!(out.json["result"]["cholesterolValue"], 260);
        assert_eq!(out.json["saved"], true);
        assert_eq!(out.json["summary"]["classification"]["level"], "critical");
        assert!(out.text.contains("260 mg/dL"));

        let stored = state.store.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].classification, Classification::Critical);
        assert!(stored[0].image_data.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn analyze_without_save_leaves_history_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.txt");
        std::fs::write(&path, generate_reference_image(160).unwrap()).unwrap();

        let state = AppState::in_memory();
        let out = analyze_strip(&state, &path, false, ConfidenceModel::ExponentialDecay).unwrap();
        assert_eq!(out.json["result"]["cholesterolValue"], 160);
        assert_eq!(out.json["result"]["confidence"], 1.0);
        assert_eq!(out.json["saved"], false);
        assert_eq!(out.json["summary"]["technicalDetails"]["confidenceModel"], "exponential");
        assert!(state.store.list().unwrap().is_empty());
    }

    #[test]
    fn analyze_reports_unreadable_file() {
        let state = AppState::in_memory();
        let err = analyze_strip(&state, Path::new("/nonexistent/strip.png"), true, ConfidenceModel::Linear)
            .unwrap_err();
        assert!(err.contains("Cannot read"));
    }

    #[test]
    fn analyze_rejects_non_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "just some text that is long enough to pass the size check ......").unwrap();
        let err = analyze_strip(&AppState::in_memory(), &path, true, ConfidenceModel::Linear).unwrap_err();
        assert!(err.contains("Unsupported media type"));
    }

    #[test]
    fn reference_writes_png_that_analyzes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.png");
        let out = write_reference(200, &path, 3, Some(11)).unwrap();
        assert_eq!(out.json["label"], "Borderline");

        let state = AppState::in_memory();
        let analyzed = analyze_strip(&state, &path, false, ConfidenceModel::Linear).unwrap();
        assert_eq!(analyzed.json["result"]["cholesterolValue"], 200);
    }

    #[test]
    fn reference_rejects_unsupported_level() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_reference(150, &dir.path().join("x.png"), 0, None).unwrap_err();
        assert!(err.contains("Unsupported"));
        assert!(!dir.path().join("x.png").exists());
    }

    #[test]
    fn levels_lists_full_table() {
        let out = list_levels().unwrap();
        assert_eq!(out.json.as_array().unwrap().len(), 9);
        assert_eq!(out.json[3]["demo"], "Borderline");
        assert!(out.text.lines().next().unwrap().starts_with("140 mg/dL  #F5E6D3"));
    }
}
