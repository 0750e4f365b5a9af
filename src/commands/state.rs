use std::path::PathBuf;

use crate::config;
use crate::history::ResultStore;
use crate::pipeline::analysis::{AnalysisConfig, ConfidenceModel, StripAnalyzer};

/// Everything a command handler needs, built once per invocation.
pub struct AppState {
    pub store: ResultStore,
    pub analysis: AnalysisConfig,
}

impl AppState {
    /// Persistent state under `data_dir` (or the default data directory).
    /// Falls back to memory when no directory can be determined.
    pub fn open(data_dir: Option<PathBuf>) -> Self {
        Self::open_resolved(data_dir.or_else(config::app_data_dir))
    }

    fn open_resolved(data_dir: Option<PathBuf>) -> Self {
        let store = match data_dir {
            Some(dir) => ResultStore::open_at(&dir),
            None => {
                tracing::warn!("No data directory available, history will not persist");
                ResultStore::memory_fallback()
            }
        };
        Self {
            store,
            analysis: AnalysisConfig::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            store: ResultStore::in_memory(),
            analysis: AnalysisConfig::default(),
        }
    }

    /// Standard analyzer over this state's config, scoring with `model`.
    pub fn analyzer(&self, model: ConfidenceModel) -> StripAnalyzer {
        StripAnalyzer::standard(self.analysis.clone()).with_confidence_model(model)
    }
}
