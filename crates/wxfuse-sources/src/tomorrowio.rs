//! Tomorrow.io adapter
//!
//! Metric units give °C and m/s directly; visibility arrives in km and
//! is normalized to meters here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use wxfuse_core::Reading;

use crate::http::get_json;
use crate::{Coordinates, SourceAdapter, SourceResult};

pub const ID: &str = "tomorrow_io";

const URL: &str = "https://api.tomorrow.io/v4/weather/realtime";

const METERS_PER_KM: f64 = 1000.0;

pub struct TomorrowIoSource {
    http: Client,
    coords: Coordinates,
    api_key: String,
}

impl TomorrowIoSource {
    pub fn new(http: Client, coords: Coordinates, api_key: String) -> Self {
        Self {
            http,
            coords,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TiResponse {
    data: TiData,
}

#[derive(Debug, Deserialize)]
struct TiData {
    values: TiValues,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiValues {
    temperature: Option<f64>,
    temperature_apparent: Option<f64>,
    humidity: Option<f64>,
    pressure_surface_level: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    cloud_cover: Option<f64>,
    visibility: Option<f64>,
    uv_index: Option<f64>,
    weather_code: Option<i64>,
}

fn describe_weather_code(code: i64) -> &'static str {
    match code {
        1000 => "Clear",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        1001 => "Cloudy",
        2000 => "Fog",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 => "Ice Pellets",
        7101 => "Heavy Ice Pellets",
        7102 => "Light Ice Pellets",
        8000 => "Thunderstorm",
        _ => "Unknown",
    }
}

fn reading_from(values: TiValues) -> Reading {
    Reading {
        temperature: values.temperature,
        feels_like: values.temperature_apparent,
        humidity: values.humidity,
        pressure: values.pressure_surface_level,
        wind_speed: values.wind_speed,
        wind_direction: values.wind_direction,
        clouds: values.cloud_cover,
        visibility: values.visibility.map(|km| km * METERS_PER_KM),
        uv_index: values.uv_index,
        weather: values
            .weather_code
            .map(|code| describe_weather_code(code).to_string()),
        ..Reading::new(ID)
    }
}

#[async_trait]
impl SourceAdapter for TomorrowIoSource {
    fn id(&self) -> &'static str {
        ID
    }

    async fn fetch(&self) -> SourceResult<Reading> {
        let query = [
            (
                "location",
                format!("{},{}", self.coords.latitude, self.coords.longitude),
            ),
            ("apikey", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        let response: TiResponse = get_json(&self.http, ID, URL, &query).await?;
        Ok(reading_from(response.data.values))
    }
}
