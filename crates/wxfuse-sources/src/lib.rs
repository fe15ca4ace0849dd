//! Weather provider fetch adapters
//!
//! One [`SourceAdapter`] implementation per upstream provider. Every
//! adapter normalizes units before handing data to the aggregator
//! (temperature °C, wind speed m/s, visibility meters, pressure hPa);
//! a provider that fails to respond is simply absent from the cycle.

pub mod http;
pub mod openmeteo;
pub mod openweather;
pub mod tomorrowio;
pub mod visualcrossing;
pub mod weatherapi;

pub use http::*;
pub use openmeteo::OpenMeteoSource;
pub use openweather::OpenWeatherMapSource;
pub use tomorrowio::TomorrowIoSource;
pub use visualcrossing::VisualCrossingSource;
pub use weatherapi::WeatherApiSource;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use wxfuse_core::Reading;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{source_id} returned status {status}: {body}")]
    Status {
        source_id: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {source_id} payload: {cause}")]
    Decode {
        source_id: &'static str,
        #[source]
        cause: serde_json::Error,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A single weather data provider.
///
/// Implementations own their request shape and payload mapping; the
/// shared `reqwest::Client` is injected so transport configuration
/// (timeouts, TLS) lives in one place.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable provider id, used as the reading's source tag.
    fn id(&self) -> &'static str;

    /// Fetch and normalize the provider's current observation.
    async fn fetch(&self) -> SourceResult<Reading>;
}

/// Observation point shared by all adapters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// API keys for the providers that need one; `None` disables a provider.
#[derive(Debug, Clone, Default)]
pub struct SourceCredentials {
    pub openweathermap: Option<String>,
    pub weatherapi: Option<String>,
    pub visualcrossing: Option<String>,
    pub tomorrow_io: Option<String>,
}

/// Build the adapter set for one deployment.
///
/// Open-Meteo requires no credential and is always attempted; keyed
/// providers are only constructed when their credential is present.
pub fn build_adapters(
    credentials: &SourceCredentials,
    coords: Coordinates,
    http: &reqwest::Client,
) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if let Some(key) = &credentials.openweathermap {
        adapters.push(Arc::new(OpenWeatherMapSource::new(
            http.clone(),
            coords,
            key.clone(),
        )));
    }
    if let Some(key) = &credentials.weatherapi {
        adapters.push(Arc::new(WeatherApiSource::new(
            http.clone(),
            coords,
            key.clone(),
        )));
    }
    if let Some(key) = &credentials.visualcrossing {
        adapters.push(Arc::new(VisualCrossingSource::new(
            http.clone(),
            coords,
            key.clone(),
        )));
    }

    adapters.push(Arc::new(OpenMeteoSource::new(http.clone(), coords)));

    if let Some(key) = &credentials.tomorrow_io {
        adapters.push(Arc::new(TomorrowIoSource::new(
            http.clone(),
            coords,
            key.clone(),
        )));
    }

    adapters
}

/// Static provider metadata served by the sources endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub update_frequency: &'static str,
    pub free_tier_limit: &'static str,
}

pub fn catalog() -> Vec<SourceInfo> {
    vec![
        SourceInfo {
            id: openweather::ID,
            name: "OpenWeatherMap",
            description: "Current weather, temperature, humidity, pressure, wind",
            update_frequency: "Every 20 minutes",
            free_tier_limit: "1000 calls/day",
        },
        SourceInfo {
            id: weatherapi::ID,
            name: "WeatherAPI",
            description: "Current conditions, air quality, astronomy data",
            update_frequency: "Every 20 minutes",
            free_tier_limit: "1 million calls/month",
        },
        SourceInfo {
            id: visualcrossing::ID,
            name: "Visual Crossing",
            description: "Detailed weather data, forecasts",
            update_frequency: "Every 20 minutes",
            free_tier_limit: "1000 records/day",
        },
        SourceInfo {
            id: openmeteo::ID,
            name: "Open-Meteo",
            description: "Weather forecasts, historical data",
            update_frequency: "Every 20 minutes",
            free_tier_limit: "Unlimited (no API key required)",
        },
        SourceInfo {
            id: tomorrowio::ID,
            name: "Tomorrow.io",
            description: "Real-time weather, air quality",
            update_frequency: "Every 20 minutes",
            free_tier_limit: "500 calls/day",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> Coordinates {
        Coordinates {
            latitude: 33.0462,
            longitude: -96.9942,
        }
    }

    fn ids(adapters: &[Arc<dyn SourceAdapter>]) -> Vec<&'static str> {
        adapters.iter().map(|a| a.id()).collect()
    }

    #[test]
    fn openmeteo_is_built_without_any_credentials() {
        let client = reqwest::Client::new();
        let adapters = build_adapters(&SourceCredentials::default(), coords(), &client);
        assert_eq!(ids(&adapters), vec!["openmeteo"]);
    }

    #[test]
    fn keyed_providers_require_their_credential() {
        let client = reqwest::Client::new();
        let credentials = SourceCredentials {
            weatherapi: Some("key".to_string()),
            tomorrow_io: Some("key".to_string()),
            ..SourceCredentials::default()
        };
        let adapters = build_adapters(&credentials, coords(), &client);
        assert_eq!(ids(&adapters), vec!["weatherapi", "openmeteo", "tomorrow_io"]);
    }

    #[test]
    fn full_credentials_build_all_five_adapters() {
        let client = reqwest::Client::new();
        let credentials = SourceCredentials {
            openweathermap: Some("a".to_string()),
            weatherapi: Some("b".to_string()),
            visualcrossing: Some("c".to_string()),
            tomorrow_io: Some("d".to_string()),
        };
        let adapters = build_adapters(&credentials, coords(), &client);
        assert_eq!(
            ids(&adapters),
            vec![
                "openweathermap",
                "weatherapi",
                "visualcrossing",
                "openmeteo",
                "tomorrow_io"
            ]
        );
    }

    #[test]
    fn catalog_covers_every_adapter() {
        let infos = catalog();
        assert_eq!(infos.len(), 5);
        let mut ids: Vec<_> = infos.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
