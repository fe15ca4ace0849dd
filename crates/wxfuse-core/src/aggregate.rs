//! Cross-source aggregation and data-quality scoring
//!
//! One collection cycle hands the readings from every source that
//! responded to [`aggregate`], which reconciles them into a single
//! [`AggregatedRecord`]. Both functions here are pure: identical input
//! yields bit-identical output, and all I/O stays with the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::{NumericField, Reading};

/// Derived summary for one numeric field across contributing readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Number of readings that supplied the field. Always <= the number
    /// of sources in the cycle.
    pub count: u32,
}

/// The reconciled multi-source observation, written once per cycle.
///
/// A numeric field with zero contributing readings is `None` and absent
/// from the serialized form, never a zeroed summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub location: String,

    /// Collection time, stamped by the caller at the moment of
    /// aggregation rather than copied from any individual reading.
    pub timestamp: DateTime<Utc>,

    /// Contributing source ids, preserving input order for provenance.
    pub sources: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<FieldSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<FieldSummary>,

    /// Most frequent non-empty condition description, ties broken by
    /// first-encountered input order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_consensus: Option<String>,

    /// The original readings, retained for audit and debugging.
    pub raw_data: Vec<Reading>,
}

impl AggregatedRecord {
    pub fn summary(&self, field: NumericField) -> Option<FieldSummary> {
        match field {
            NumericField::Temperature => self.temperature,
            NumericField::FeelsLike => self.feels_like,
            NumericField::Humidity => self.humidity,
            NumericField::Pressure => self.pressure,
            NumericField::WindSpeed => self.wind_speed,
            NumericField::WindDirection => self.wind_direction,
            NumericField::Clouds => self.clouds,
            NumericField::Visibility => self.visibility,
            NumericField::UvIndex => self.uv_index,
        }
    }

    fn set_summary(&mut self, field: NumericField, summary: Option<FieldSummary>) {
        match field {
            NumericField::Temperature => self.temperature = summary,
            NumericField::FeelsLike => self.feels_like = summary,
            NumericField::Humidity => self.humidity = summary,
            NumericField::Pressure => self.pressure = summary,
            NumericField::WindSpeed => self.wind_speed = summary,
            NumericField::WindDirection => self.wind_direction = summary,
            NumericField::Clouds => self.clouds = summary,
            NumericField::Visibility => self.visibility = summary,
            NumericField::UvIndex => self.uv_index = summary,
        }
    }
}

/// Round to the 2-decimal precision used throughout stored records.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reconcile one cycle's readings into a single record.
///
/// `at` is the collection time; the caller stamps it so the function
/// stays deterministic. An empty slice yields a record with no sources
/// and no field summaries; the collector treats that case as a failed
/// cycle and never writes it.
pub fn aggregate(location: &str, readings: &[Reading], at: DateTime<Utc>) -> AggregatedRecord {
    let mut record = AggregatedRecord {
        location: location.to_string(),
        timestamp: at,
        sources: readings.iter().map(|r| r.source.clone()).collect(),
        temperature: None,
        feels_like: None,
        humidity: None,
        pressure: None,
        wind_speed: None,
        wind_direction: None,
        clouds: None,
        visibility: None,
        uv_index: None,
        weather_consensus: weather_consensus(readings),
        raw_data: readings.to_vec(),
    };

    for field in NumericField::ALL {
        let values: Vec<f64> = readings.iter().filter_map(|r| r.numeric(field)).collect();
        record.set_summary(field, summarize(&values));
    }

    record
}

fn summarize(values: &[f64]) -> Option<FieldSummary> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(FieldSummary {
        avg: round2(sum / values.len() as f64),
        min: round2(min),
        max: round2(max),
        count: values.len() as u32,
    })
}

/// Majority vote over non-empty condition descriptions.
///
/// The tally preserves first-encounter order and a candidate only
/// displaces the leader on a strictly higher count, so ties resolve to
/// whichever value was seen first in the input.
fn weather_consensus(readings: &[Reading]) -> Option<String> {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for description in readings
        .iter()
        .filter_map(|r| r.weather.as_deref())
        .filter(|w| !w.is_empty())
    {
        match tally.iter_mut().find(|(value, _)| *value == description) {
            Some((_, count)) => *count += 1,
            None => tally.push((description, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in tally {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Mean fraction of declared fields populated across all readings in a
/// cycle, rounded to 2 decimals. A reading with every field absent
/// contributes 0; an empty cycle scores 0.0 (and is rejected upstream
/// before anything is written).
pub fn quality_score(readings: &[Reading]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }
    let total: f64 = readings
        .iter()
        .map(|r| r.populated_fields() as f64 / Reading::DECLARED_FIELDS as f64)
        .sum();
    round2(total / readings.len() as f64)
}
