//! Command handlers behind the CLI.
//!
//! Handlers return a [`CommandOutput`] carrying both a text rendering and a
//! JSON value; errors are flattened to `String` for display.

pub mod analysis;
pub mod history;
pub mod state;

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::models::{Classification, TestResult};

pub use state::AppState;

/// Result of one command, renderable as text or JSON.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub text: String,
    pub json: Value,
}

impl CommandOutput {
    pub fn new<T: Serialize>(text: impl Into<String>, data: &T) -> Result<Self, String> {
        let json = serde_json::to_value(data).map_err(|e| format!("Failed to serialize output: {e}"))?;
        Ok(Self {
            text: text.into(),
            json,
        })
    }

    pub fn render(&self, json: bool) -> String {
        if json {
            serde_json::to_string_pretty(&self.json).unwrap_or_else(|_| self.json.to_string())
        } else {
            self.text.clone()
        }
    }
}

/// A stored result without its embedded image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub id: String,
    pub timestamp: i64,
    pub recorded_at: Option<String>,
    pub cholesterol_value: u32,
    pub classification: Classification,
    pub confidence: f64,
}

impl From<&TestResult> for ResultView {
    fn from(r: &TestResult) -> Self {
        Self {
            id: r.id.clone(),
            timestamp: r.timestamp,
            recorded_at: r.recorded_at().map(|t| t.to_rfc3339()),
            cholesterol_value: r.cholesterol_value,
            classification: r.classification,
            confidence: r.confidence,
        }
    }
}

impl ResultView {
    /// One text line: date, value, band, confidence, id.
    pub fn line(&self) -> String {
        let date = self
            .recorded_at
            .as_deref()
            .and_then(|s| s.get(..10))
            .unwrap_or("unknown");
        format!(
            "{date}  {:>3} mg/dL  {:<8}  {:>3.0}%  {}",
            self.cholesterol_value,
            self.classification.as_str(),
            self.confidence * 100.0,
            self.id
        )
    }
}

/// Write `bytes` to `path` via a sibling temp file renamed into place.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| format!("Failed to create temp file in {}: {e}", dir.display()))?;
    tmp.write_all(bytes)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e.error))?;
    Ok(())
}
