//! OpenWeatherMap adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use wxfuse_core::Reading;

use crate::http::get_json;
use crate::{Coordinates, SourceAdapter, SourceResult};

pub const ID: &str = "openweathermap";

const URL: &str = "https://api.openweathermap.org/data/2.5/weather";

pub struct OpenWeatherMapSource {
    http: Client,
    coords: Coordinates,
    api_key: String,
}

impl OpenWeatherMapSource {
    pub fn new(http: Client, coords: Coordinates, api_key: String) -> Self {
        Self {
            http,
            coords,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    main: OwMain,
    wind: Option<OwWind>,
    clouds: Option<OwClouds>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

fn reading_from(response: OwResponse) -> Reading {
    Reading {
        temperature: response.main.temp,
        feels_like: response.main.feels_like,
        humidity: response.main.humidity,
        pressure: response.main.pressure,
        wind_speed: response.wind.as_ref().and_then(|w| w.speed),
        wind_direction: response.wind.as_ref().and_then(|w| w.deg),
        clouds: response.clouds.as_ref().and_then(|c| c.all),
        visibility: response.visibility,
        weather: response.weather.into_iter().next().map(|w| w.main),
        ..Reading::new(ID)
    }
}

#[async_trait]
impl SourceAdapter for OpenWeatherMapSource {
    fn id(&self) -> &'static str {
        ID
    }

    async fn fetch(&self) -> SourceResult<Reading> {
        // units=metric gives °C and m/s directly.
        let query = [
            ("lat", self.coords.latitude.to_string()),
            ("lon", self.coords.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        let response: OwResponse = get_json(&self.http, ID, URL, &query).await?;
        Ok(reading_from(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_nested_payload_to_reading() {
        let json = r#"{
            "main": {"temp": 25.5, "feels_like": 26.0, "humidity": 65, "pressure": 1013},
            "wind": {"speed": 3.5, "deg": 180},
            "clouds": {"all": 40},
            "weather": [{"main": "Clouds", "description": "scattered clouds"}],
            "visibility": 10000,
            "dt": 1234567890
        }"#;
        let response: OwResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from(response);

        assert_eq!(reading.source, "openweathermap");
        assert_eq!(reading.temperature, Some(25.5));
        assert_eq!(reading.humidity, Some(65.0));
        assert_eq!(reading.wind_direction, Some(180.0));
        assert_eq!(reading.visibility, Some(10000.0));
        assert_eq!(reading.weather.as_deref(), Some("Clouds"));
    }

    #[test]
    fn tolerates_missing_wind_and_weather_blocks() {
        let json = r#"{"main": {"temp": 19.0}}"#;
        let response: OwResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from(response);

        assert_eq!(reading.temperature, Some(19.0));
        assert_eq!(reading.wind_speed, None);
        assert_eq!(reading.weather, None);
    }
}
