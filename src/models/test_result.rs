use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Classification;

/// One completed strip analysis, as persisted in the history store.
///
/// Field names follow the stored JSON layout (camelCase). Older exports
/// name the image field `imageDataUrl`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// mg/dL
    pub cholesterol_value: u32,
    pub classification: Classification,
    #[serde(alias = "imageDataUrl")]
    pub image_data: String,
    pub confidence: f64,
}

impl TestResult {
    /// Build a fresh result stamped with a new id and the current time.
    pub fn new(
        cholesterol_value: u32,
        classification: Classification,
        image_data: String,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            cholesterol_value,
            classification,
            image_data,
            confidence,
        }
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Aggregate view over the stored history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStats {
    pub total_tests: usize,
    pub last_test: Option<DateTime<Utc>>,
    /// Rounded mean, mg/dL. Zero when the history is empty.
    pub average_value: u32,
}

impl TestStats {
    pub fn empty() -> Self {
        Self {
            total_tests: 0,
            last_test: None,
            average_value: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_result_gets_unique_id_and_timestamp() {
        let a = TestResult::new(180, Classification::High, "data:image/png;base64,".into(), 0.9);
        let b = TestResult::new(180, Classification::High, "data:image/png;base64,".into(), 0.9);
        assert_ne!(a.id, b.id);
        assert!(a.timestamp > 0);
        assert!(a.recorded_at().is_some());
    }

    #[test]
    fn serializes_camel_case() {
        let result = TestResult {
            id: "test_1".into(),
            timestamp: 1_700_000_000_000,
            cholesterol_value: 200,
            classification: Classification::High,
            image_data: "data:image/png;base64,AAAA".into(),
            confidence: 0.95,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["cholesterolValue"], 200);
        assert_eq!(json["imageData"], "data:image/png;base64,AAAA");
        assert_eq!(json["classification"], "high");
    }

    #[test]
    fn accepts_legacy_image_field_name() {
        let json = r#"{
            "id": "test_2020_03_15_sample1",
            "timestamp": 1584264600000,
            "cholesterolValue": 185,
            "classification": "high",
            "imageDataUrl": "data:image/jpeg;base64,sample_data_1",
            "confidence": 0.92
        }"#;
        let result: TestResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.image_data, "data:image/jpeg;base64,sample_data_1");
        assert_eq!(result.cholesterol_value, 185);
    }

    #[test]
    fn negative_value_does_not_deserialize() {
        let json = r#"{"id":"x","timestamp":1,"cholesterolValue":-5,
            "classification":"normal","imageData":"","confidence":0.5}"#;
        assert!(serde_json::from_str::<TestResult>(json).is_err());
    }

    #[test]
    fn stats_empty_defaults() {
        let stats = TestStats::empty();
        assert_eq!(stats.total_tests, 0);
        assert!(stats.last_test.is_none());
        assert_eq!(stats.average_value, 0);
    }
}
