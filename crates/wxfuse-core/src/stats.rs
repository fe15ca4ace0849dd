//! Windowed statistics over stored records
//!
//! Computed on demand for historical queries and never persisted. The
//! inputs are the per-record field averages, so this is a statistic of
//! statistics rather than a re-aggregation of raw readings.

use serde::{Deserialize, Serialize};

use crate::aggregate::{round2, AggregatedRecord};
use crate::reading::NumericField;

/// Fields summarized for historical windows.
pub const TRACKED_FIELDS: [NumericField; 3] = [
    NumericField::Temperature,
    NumericField::Humidity,
    NumericField::Pressure,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    /// Mean of per-record averages, rounded to 2 decimals.
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary statistics for a queried window. A field with no contributing
/// records in the window is `None`, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStatistics {
    pub temperature: Option<StatSummary>,
    pub humidity: Option<StatSummary>,
    pub pressure: Option<StatSummary>,
}

/// Summarize the tracked fields across a window of records.
pub fn window_statistics<'a, I>(records: I) -> WindowStatistics
where
    I: IntoIterator<Item = &'a AggregatedRecord>,
{
    let records: Vec<&AggregatedRecord> = records.into_iter().collect();
    WindowStatistics {
        temperature: stat_for(&records, NumericField::Temperature),
        humidity: stat_for(&records, NumericField::Humidity),
        pressure: stat_for(&records, NumericField::Pressure),
    }
}

fn stat_for(records: &[&AggregatedRecord], field: NumericField) -> Option<StatSummary> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.summary(field).map(|s| s.avg))
        .collect();
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(StatSummary {
        avg: round2(sum / values.len() as f64),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::reading::Reading;
    use chrono::{TimeZone, Utc};

    fn record(temperature: Option<f64>, humidity: Option<f64>) -> AggregatedRecord {
        let reading = Reading {
            temperature,
            humidity,
            ..Reading::new("a")
        };
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        aggregate("lewisville-tx", &[reading], at)
    }

    #[test]
    fn statistics_summarize_per_record_averages() {
        let records = vec![
            record(Some(20.0), Some(70.0)),
            record(Some(24.0), Some(60.0)),
            record(Some(22.0), None),
        ];
        let stats = window_statistics(&records);

        let temp = stats.temperature.unwrap();
        assert_eq!(temp.avg, 22.0);
        assert_eq!(temp.min, 20.0);
        assert_eq!(temp.max, 24.0);

        // Only two records carried humidity.
        let humidity = stats.humidity.unwrap();
        assert_eq!(humidity.avg, 65.0);
    }

    #[test]
    fn untracked_window_reports_none_not_zero() {
        let records = vec![record(Some(20.0), None), record(Some(21.0), None)];
        let stats = window_statistics(&records);
        assert!(stats.humidity.is_none());
        assert!(stats.pressure.is_none());
    }

    #[test]
    fn empty_window_has_no_statistics() {
        let stats = window_statistics([]);
        assert!(stats.temperature.is_none());
        assert!(stats.humidity.is_none());
        assert!(stats.pressure.is_none());
    }

    #[test]
    fn averages_round_to_two_decimals() {
        let records = vec![
            record(Some(20.0), None),
            record(Some(20.1), None),
            record(Some(20.1), None),
        ];
        let stats = window_statistics(&records);
        assert_eq!(stats.temperature.unwrap().avg, 20.07);
    }
}
