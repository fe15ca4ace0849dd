//! WeatherAPI.com adapter
//!
//! Wind arrives in km/h and visibility in km; both are normalized here
//! before the reading leaves the adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use wxfuse_core::Reading;

use crate::http::get_json;
use crate::{Coordinates, SourceAdapter, SourceResult};

pub const ID: &str = "weatherapi";

const URL: &str = "https://api.weatherapi.com/v1/current.json";

const KPH_PER_MPS: f64 = 3.6;
const METERS_PER_KM: f64 = 1000.0;

pub struct WeatherApiSource {
    http: Client,
    coords: Coordinates,
    api_key: String,
}

impl WeatherApiSource {
    pub fn new(http: Client, coords: Coordinates, api_key: String) -> Self {
        Self {
            http,
            coords,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Option<f64>,
    feelslike_c: Option<f64>,
    humidity: Option<f64>,
    pressure_mb: Option<f64>,
    wind_kph: Option<f64>,
    wind_degree: Option<f64>,
    cloud: Option<f64>,
    vis_km: Option<f64>,
    uv: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

fn reading_from(current: WaCurrent) -> Reading {
    Reading {
        temperature: current.temp_c,
        feels_like: current.feelslike_c,
        humidity: current.humidity,
        // pressure_mb is millibars, numerically equal to hPa.
        pressure: current.pressure_mb,
        wind_speed: current.wind_kph.map(|kph| kph / KPH_PER_MPS),
        wind_direction: current.wind_degree,
        clouds: current.cloud,
        visibility: current.vis_km.map(|km| km * METERS_PER_KM),
        uv_index: current.uv,
        weather: current.condition.map(|c| c.text),
        ..Reading::new(ID)
    }
}

#[async_trait]
impl SourceAdapter for WeatherApiSource {
    fn id(&self) -> &'static str {
        ID
    }

    async fn fetch(&self) -> SourceResult<Reading> {
        let query = [
            ("key", self.api_key.clone()),
            (
                "q",
                format!("{},{}", self.coords.latitude, self.coords.longitude),
            ),
        ];
        let response: WaResponse = get_json(&self.http, ID, URL, &query).await?;
        Ok(reading_from(response.current))
    }
}
