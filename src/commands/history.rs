//! History commands.

use std::path::Path;

use serde::Serialize;

use crate::history::{
    clear_samples, compare_with_history, inject_samples, HistoricalStats, HistoryError,
};
use crate::pipeline::analysis::AnalysisSummary;

use super::{write_atomically, AppState, CommandOutput, ResultView};

fn to_message(e: HistoryError) -> String {
    e.to_string()
}

pub fn list_results(state: &AppState) -> Result<CommandOutput, String> {
    let results = state.store.list().map_err(to_message)?;
    let views: Vec<ResultView> = results.iter().map(ResultView::from).collect();

    let text = if views.is_empty() {
        "No test results recorded.".to_string()
    } else {
        views.iter().map(ResultView::line).collect::<Vec<_>>().join("\n")
    };
    CommandOutput::new(text, &views)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowView {
    pub result: ResultView,
    pub summary: AnalysisSummary,
}

pub fn show_result(state: &AppState, id: &str) -> Result<CommandOutput, String> {
    let result = state
        .store
        .get(id)
        .map_err(to_message)?
        .ok_or_else(|| format!("No test result with id {id}"))?;

    let view = ShowView {
        result: ResultView::from(&result),
        summary: AnalysisSummary::for_result(&result),
    };
    let text = format!(
        "{}\n{}\n{}",
        view.result.line(),
        view.summary.classification.description,
        view.summary.classification.advice
    );
    CommandOutput::new(text, &view)
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: usize,
}

pub fn delete_result(state: &AppState, id: &str) -> Result<CommandOutput, String> {
    let deleted = state.store.delete(id).map_err(to_message)?;
    let text = if deleted {
        format!("Deleted {id}.")
    } else {
        format!("No test result with id {id}; nothing deleted.")
    };
    CommandOutput::new(text, &serde_json::json!({ "id": id, "deleted": deleted }))
}

pub fn clear_results(state: &AppState) -> Result<CommandOutput, String> {
    state.store.clear().map_err(to_message)?;
    CommandOutput::new("History cleared.", &serde_json::json!({ "cleared": true }))
}

pub fn result_stats(state: &AppState) -> Result<CommandOutput, String> {
    let stats = state.store.stats().map_err(to_message)?;
    let last = stats
        .last_test
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    let text = format!(
        "Tests: {}\nLast test: {}\nAverage: {} mg/dL\nStorage: {} ({})",
        stats.total_tests,
        last,
        stats.average_value,
        state.store.mode(),
        state.store.describe()
    );
    CommandOutput::new(text, &stats)
}

/// Export to `output`, or return the JSON as the text output when `None`.
pub fn export_results(state: &AppState, output: Option<&Path>) -> Result<CommandOutput, String> {
    let json = state.store.export_json().map_err(to_message)?;
    let count = state.store.list().map_err(to_message)?.len();

    match output {
        Some(path) => {
            write_atomically(path, json.as_bytes())?;
            tracing::info!(count, path = %path.display(), "History exported");
            CommandOutput::new(
                format!("Exported {count} results to {}", path.display()),
                &serde_json::json!({ "exported": count, "path": path.display().to_string() }),
            )
        }
        None => {
            let value: serde_json::Value =
                serde_json::from_str(&json).map_err(|e| format!("Export produced invalid JSON: {e}"))?;
            Ok(CommandOutput { text: json, json: value })
        }
    }
}

pub fn import_results(state: &AppState, file: &Path) -> Result<CommandOutput, String> {
    let json = std::fs::read_to_string(file).map_err(|e| format!("Cannot read {}: {e}", file.display()))?;
    let count = state.store.import_json(&json).map_err(to_message)?;
    CommandOutput::new(format!("Imported {count} results."), &CountView { count })
}

pub fn seed_samples(state: &AppState) -> Result<CommandOutput, String> {
    let count = inject_samples(&state.store).map_err(to_message)?;
    CommandOutput::new(format!("Added {count} sample results."), &CountView { count })
}

pub fn remove_samples(state: &AppState) -> Result<CommandOutput, String> {
    let count = clear_samples(&state.store).map_err(to_message)?;
    CommandOutput::new(format!("Removed {count} sample results."), &CountView { count })
}

pub fn compare_result(state: &AppState, id: &str) -> Result<CommandOutput, String> {
    let current = state
        .store
        .get(id)
        .map_err(to_message)?
        .ok_or_else(|| format!("No test result with id {id}"))?;
    let history = state.store.list().map_err(to_message)?;
    let stats: HistoricalStats = compare_with_history(&current, &history);

    let mut text = format!(
        "Current: {} mg/dL\nAverage of other tests: {} mg/dL\nTests compared: {}",
        current.cholesterol_value, stats.average, stats.test_count
    );
    match &stats.trend {
        Some(trend) => text.push_str(&format!(
            "\nTrend: {} ({:+} mg/dL, {}% vs previous {} mg/dL)",
            trend.direction, trend.change, trend.percentage, trend.previous_value
        )),
        None => text.push_str("\nTrend: not enough history"),
    }
    for recent in &stats.recent_tests {
        text.push_str(&format!("\n  {}", ResultView::from(recent).line()));
    }

    CommandOutput::new(text, &CompareView::new(&current, &stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareView {
    pub current: ResultView,
    pub average: u32,
    pub test_count: usize,
    pub trend: Option<crate::history::TrendData>,
    pub recent_tests: Vec<ResultView>,
}

impl CompareView {
    fn new(current: &crate::models::TestResult, stats: &HistoricalStats) -> Self {
        Self {
            current: ResultView::from(current),
            average: stats.average,
            test_count: stats.test_count,
            trend: stats.trend.clone(),
            recent_tests: stats.recent_tests.iter().map(ResultView::from).collect(),
        }
    }
}
