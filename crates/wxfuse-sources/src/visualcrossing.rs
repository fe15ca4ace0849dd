//! Visual Crossing adapter
//!
//! The timeline endpoint nests the live observation under
//! `currentConditions`; when that block is missing the first day summary
//! stands in for it. Metric unit group still reports wind in km/h and
//! visibility in km.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use wxfuse_core::Reading;

use crate::http::get_json;
use crate::{Coordinates, SourceAdapter, SourceResult};

pub const ID: &str = "visualcrossing";

const BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

const KMH_TO_MPS: f64 = 0.27778;
const METERS_PER_KM: f64 = 1000.0;

pub struct VisualCrossingSource {
    http: Client,
    coords: Coordinates,
    api_key: String,
}

impl VisualCrossingSource {
    pub fn new(http: Client, coords: Coordinates, api_key: String) -> Self {
        Self {
            http,
            coords,
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{BASE_URL}/{},{}/today",
            self.coords.latitude, self.coords.longitude
        )
    }
}

#[derive(Debug, Deserialize)]
struct VcResponse {
    #[serde(rename = "currentConditions")]
    current_conditions: Option<VcConditions>,
    #[serde(default)]
    days: Vec<VcConditions>,
}

#[derive(Debug, Deserialize)]
struct VcConditions {
    temp: Option<f64>,
    feelslike: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    windspeed: Option<f64>,
    winddir: Option<f64>,
    cloudcover: Option<f64>,
    visibility: Option<f64>,
    uvindex: Option<f64>,
    conditions: Option<String>,
}

fn reading_from(response: VcResponse) -> Option<Reading> {
    let conditions = response
        .current_conditions
        .or_else(|| response.days.into_iter().next())?;

    Some(Reading {
        temperature: conditions.temp,
        feels_like: conditions.feelslike,
        humidity: conditions.humidity,
        pressure: conditions.pressure,
        wind_speed: conditions.windspeed.map(|kmh| kmh * KMH_TO_MPS),
        wind_direction: conditions.winddir,
        clouds: conditions.cloudcover,
        visibility: conditions.visibility.map(|km| km * METERS_PER_KM),
        uv_index: conditions.uvindex,
        weather: conditions.conditions,
        ..Reading::new(ID)
    })
}

#[async_trait]
impl SourceAdapter for VisualCrossingSource {
    fn id(&self) -> &'static str {
        ID
    }

    async fn fetch(&self) -> SourceResult<Reading> {
        let query = [
            ("key", self.api_key.clone()),
            ("unitGroup", "metric".to_string()),
            ("include", "current".to_string()),
        ];
        let response: VcResponse = get_json(&self.http, ID, &self.url(), &query).await?;
        // A payload with neither block has nothing to observe.
        Ok(reading_from(response).unwrap_or_else(|| Reading::new(ID)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_current_conditions_block() {
        let json = r#"{
            "currentConditions": {
                "temp": 27.0,
                "feelslike": 29.0,
                "humidity": 55.0,
                "pressure": 1010.0,
                "windspeed": 18.0,
                "winddir": 200.0,
                "cloudcover": 30.0,
                "visibility": 16.0,
                "uvindex": 7.0,
                "conditions": "Partially cloudy"
            },
            "days": [{"temp": 99.0}]
        }"#;
        let response: VcResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from(response).unwrap();

        assert_eq!(reading.source, "visualcrossing");
        assert_eq!(reading.temperature, Some(27.0));
        assert_eq!(reading.wind_speed, Some(18.0 * KMH_TO_MPS));
        assert_eq!(reading.visibility, Some(16000.0));
        assert_eq!(reading.weather.as_deref(), Some("Partially cloudy"));
    }

    #[test]
    fn falls_back_to_first_day_summary() {
        let json = r#"{"days": [{"temp": 15.5, "conditions": "Rain"}]}"#;
        let response: VcResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from(response).unwrap();

        assert_eq!(reading.temperature, Some(15.5));
        assert_eq!(reading.weather.as_deref(), Some("Rain"));
    }

    #[test]
    fn empty_payload_yields_no_reading() {
        let json = r#"{"days": []}"#;
        let response: VcResponse = serde_json::from_str(json).unwrap();
        assert!(reading_from(response).is_none());
    }
}
