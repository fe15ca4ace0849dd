//! Open-Meteo adapter
//!
//! The only provider that requires no credential, so it is always part
//! of the configured adapter set. Wind speed is requested in m/s so the
//! payload arrives already normalized.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use wxfuse_core::Reading;

use crate::http::get_json;
use crate::{Coordinates, SourceAdapter, SourceResult};

pub const ID: &str = "openmeteo";

const URL: &str = "https://api.open-meteo.com/v1/forecast";
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
                              weather_code,pressure_msl,wind_speed_10m,wind_direction_10m,cloud_cover";

pub struct OpenMeteoSource {
    http: Client,
    coords: Coordinates,
}

impl OpenMeteoSource {
    pub fn new(http: Client, coords: Coordinates) -> Self {
        Self { http, coords }
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    pressure_msl: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    cloud_cover: Option<f64>,
    weather_code: Option<i64>,
}

/// WMO weather interpretation codes.
fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

fn reading_from(current: OmCurrent) -> Reading {
    Reading {
        temperature: current.temperature_2m,
        feels_like: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        pressure: current.pressure_msl,
        wind_speed: current.wind_speed_10m,
        wind_direction: current.wind_direction_10m,
        clouds: current.cloud_cover,
        weather: current
            .weather_code
            .map(|code| describe_weather_code(code).to_string()),
        ..Reading::new(ID)
    }
}

#[async_trait]
impl SourceAdapter for OpenMeteoSource {
    fn id(&self) -> &'static str {
        ID
    }

    async fn fetch(&self) -> SourceResult<Reading> {
        let query = [
            ("latitude", self.coords.latitude.to_string()),
            ("longitude", self.coords.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("wind_speed_unit", "ms".to_string()),
        ];
        let response: OmResponse = get_json(&self.http, ID, URL, &query).await?;
        Ok(reading_from(response.current))
    }
}
