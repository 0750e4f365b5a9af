//! How one result sits against the rest of the history.

use serde::Serialize;

use crate::models::{TestResult, TrendDirection};

/// Changes within this many mg/dL read as stable.
pub const STABLE_BAND: i64 = 5;

/// Records listed alongside the comparison.
pub const RECENT_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendData {
    pub direction: TrendDirection,
    /// Rounded absolute change relative to the previous value, in percent.
    pub percentage: u32,
    pub previous_value: u32,
    /// current - previous, mg/dL
    pub change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalStats {
    /// Rounded mean of the other records, or the current value when there
    /// are none.
    pub average: u32,
    pub trend: Option<TrendData>,
    /// Other records plus the current one.
    pub test_count: usize,
    pub recent_tests: Vec<TestResult>,
}

/// Compare `current` with `history` (newest first). Any record in `history`
/// with the same id as `current` is ignored.
pub fn compare_with_history(current: &TestResult, history: &[TestResult]) -> HistoricalStats {
    let others: Vec<&TestResult> = history.iter().filter(|r| r.id != current.id).collect();

    let Some(previous) = others.first() else {
        return HistoricalStats {
            average: current.cholesterol_value,
            trend: None,
            test_count: 1,
            recent_tests: Vec::new(),
        };
    };

    let total: u64 = others.iter().map(|r| u64::from(r.cholesterol_value)).sum();
    let average = (total as f64 / others.len() as f64).round() as u32;

    HistoricalStats {
        average,
        trend: Some(trend_between(current.cholesterol_value, previous.cholesterol_value)),
        test_count: others.len() + 1,
        recent_tests: others.iter().take(RECENT_LIMIT).map(|r| (*r).clone()).collect(),
    }
}

fn trend_between(current: u32, previous: u32) -> TrendData {
    let change = i64::from(current) - i64::from(previous);
    let percentage = if previous == 0 {
        0
    } else {
        (change.abs() as f64 / f64::from(previous) * 100.0).round() as u32
    };
    let direction = if change > STABLE_BAND {
        TrendDirection::Up
    } else if change < -STABLE_BAND {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    TrendData {
        direction,
        percentage,
        previous_value: previous,
        change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analysis::classify;

    fn record(id: &str, timestamp: i64, value: u32) -> TestResult {
        TestResult {
            id: id.into(),
            timestamp,
            cholesterol_value: value,
            classification: classify(value),
            image_data: String::new(),
            confidence: 0.9,
        }
    }

    #[test]
    fn alone_in_history() {
        let current = record("c", 10, 210);
        let stats = compare_with_history(&current, &[current.clone()]);
        assert_eq!(stats.average, 210);
        assert!(stats.trend.is_none());
        assert_eq!(stats.test_count, 1);
        assert!(stats.recent_tests.is_empty());
    }

    #[test]
    fn upward_trend_against_most_recent_other() {
        let current = record("c", 10, 220);
        let history = vec![current.clone(), record("b", 9, 200), record("a", 8, 181)];
        let stats = compare_with_history(&current, &history);

        // (200 + 181) / 2 = 190.5
        assert_eq!(stats.average, 191);
        assert_eq!(stats.test_count, 3);
        let trend = stats.trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.change, 20);
        assert_eq!(trend.previous_value, 200);
        assert_eq!(trend.percentage, 10);
    }

    #[test]
    fn small_changes_are_stable() {
        let current = record("c", 10, 185);
        for (previous, expected) in [
            (180, TrendDirection::Stable),
            (190, TrendDirection::Stable),
            (179, TrendDirection::Up),
            (191, TrendDirection::Down),
        ] {
            let stats = compare_with_history(&current, &[record("p", 1, previous)]);
            assert_eq!(stats.trend.unwrap().direction, expected, "previous {previous}");
        }
    }

    #[test]
    fn downward_percentage_is_absolute() {
        let current = record("c", 10, 150);
        let stats = compare_with_history(&current, &[record("p", 1, 200)]);
        let trend = stats.trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.change, -50);
        assert_eq!(trend.percentage, 25);
    }

    #[test]
    fn recent_is_capped_at_six() {
        let current = record("c", 100, 200);
        let history: Vec<TestResult> = (0..10).map(|i| record(&format!("h{i}"), 99 - i, 180)).collect();
        let stats = compare_with_history(&current, &history);
        assert_eq!(stats.recent_tests.len(), RECENT_LIMIT);
        assert_eq!(stats.recent_tests[0].id, "h0");
        assert_eq!(stats.test_count, 11);
    }
}
