//! Fixed historical records for demonstrations.

use crate::models::{Classification, TestResult};

use super::{HistoryError, ResultStore};

struct SampleRecord {
    id: &'static str,
    timestamp: i64,
    value: u32,
    classification: Classification,
    confidence: f64,
    image_tag: &'static str,
}

const SAMPLES: [SampleRecord; 5] = [
    SampleRecord {
        id: "test_2020_03_15_sample1",
        timestamp: 1_584_264_600_000,
        value: 185,
        classification: Classification::High,
        confidence: 0.92,
        image_tag: "sample_data_1",
    },
    SampleRecord {
        id: "test_2020_09_22_sample2",
        timestamp: 1_600_784_100_000,
        value: 195,
        classification: Classification::High,
        confidence: 0.88,
        image_tag: "sample_data_2",
    },
    SampleRecord {
        id: "test_2021_05_08_sample3",
        timestamp: 1_620_474_300_000,
        value: 210,
        classification: Classification::High,
        confidence: 0.91,
        image_tag: "sample_data_3",
    },
    SampleRecord {
        id: "test_2022_01_12_sample4",
        timestamp: 1_642_004_400_000,
        value: 165,
        classification: Classification::Normal,
        confidence: 0.95,
        image_tag: "sample_data_4",
    },
    SampleRecord {
        id: "test_2023_07_30_sample5",
        timestamp: 1_690_711_800_000,
        value: 175,
        classification: Classification::High,
        confidence: 0.89,
        image_tag: "sample_data_5",
    },
];

pub fn sample_results() -> Vec<TestResult> {
    SAMPLES
        .iter()
        .map(|s| TestResult {
            id: s.id.to_string(),
            timestamp: s.timestamp,
            cholesterol_value: s.value,
            classification: s.classification,
            image_data: format!("data:image/jpeg;base64,{}", s.image_tag),
            confidence: s.confidence,
        })
        .collect()
}

pub fn is_sample_id(id: &str) -> bool {
    SAMPLES.iter().any(|s| s.id == id)
}

/// Add the sample records that are not stored yet. Returns how many were added.
pub fn inject_samples(store: &ResultStore) -> Result<usize, HistoryError> {
    let added = store.merge(sample_results())?;
    tracing::info!(added, "Sample results injected");
    Ok(added)
}

/// Remove the sample records, leaving real results alone.
pub fn clear_samples(store: &ResultStore) -> Result<usize, HistoryError> {
    let removed = store.remove_where(|r| is_sample_id(&r.id))?;
    tracing::info!(removed, "Sample results cleared");
    Ok(removed)
}

pub fn has_samples(store: &ResultStore) -> Result<bool, HistoryError> {
    Ok(store.list()?.iter().any(|r| is_sample_id(&r.id)))
}
