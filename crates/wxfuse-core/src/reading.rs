//! Per-source normalized observations

use serde::{Deserialize, Serialize};

/// Numeric observation fields shared by every provider reading.
///
/// Aggregation iterates this enum rather than stringly-typed keys, so a
/// field added here is automatically picked up by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Temperature,
    FeelsLike,
    Humidity,
    Pressure,
    WindSpeed,
    WindDirection,
    Clouds,
    Visibility,
    UvIndex,
}

impl NumericField {
    pub const ALL: [NumericField; 9] = [
        NumericField::Temperature,
        NumericField::FeelsLike,
        NumericField::Humidity,
        NumericField::Pressure,
        NumericField::WindSpeed,
        NumericField::WindDirection,
        NumericField::Clouds,
        NumericField::Visibility,
        NumericField::UvIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::Temperature => "temperature",
            NumericField::FeelsLike => "feels_like",
            NumericField::Humidity => "humidity",
            NumericField::Pressure => "pressure",
            NumericField::WindSpeed => "wind_speed",
            NumericField::WindDirection => "wind_direction",
            NumericField::Clouds => "clouds",
            NumericField::Visibility => "visibility",
            NumericField::UvIndex => "uv_index",
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider's observation for a single collection cycle.
///
/// Invariant: numeric values are already unit-normalized by the adapter
/// that produced the reading (temperature °C, wind speed m/s, visibility
/// meters, pressure hPa). The aggregator never converts units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Provider id, e.g. "openmeteo".
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,

    /// Free-text condition description, e.g. "Partly cloudy".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl Reading {
    /// Number of declared fields in the schema: nine numeric plus the
    /// weather description. The `source` id is not an observation.
    pub const DECLARED_FIELDS: usize = NumericField::ALL.len() + 1;

    /// An empty reading carrying only the source id.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            temperature: None,
            feels_like: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_direction: None,
            clouds: None,
            visibility: None,
            uv_index: None,
            weather: None,
        }
    }

    pub fn numeric(&self, field: NumericField) -> Option<f64> {
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

    /// Count of declared fields that carry a value.
    pub fn populated_fields(&self) -> usize {
        let numeric = NumericField::ALL
            .iter()
            .filter(|f| self.numeric(**f).is_some())
            .count();
        numeric + usize::from(self.weather.is_some())
    }
}
