//! Configuration and credential retrieval
//!
//! One TOML file (path from `WXFUSE_CONFIG`, default `wxfuse.toml`)
//! shared by the collector daemon and the API server; every section is
//! optional and falls back to defaults. Provider API keys resolve from
//! the environment first so deployments can inject secrets without
//! writing them to disk.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind: Option<String>,
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub interval_secs: Option<u64>,
}

/// Per-provider credential, e.g.
///
/// ```toml
/// [providers.openweathermap]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub location: Option<LocationConfig>,
    pub http: Option<HttpConfig>,
    pub store: Option<StoreConfig>,
    pub collector: Option<CollectorConfig>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from the `WXFUSE_CONFIG` path if the file
    /// exists, defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("WXFUSE_CONFIG").unwrap_or_else(|_| "wxfuse.toml".to_string());
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Location id used as the store partition key (default "lewisville-tx").
    pub fn location_id(&self) -> String {
        self.location
            .as_ref()
            .and_then(|l| l.id.clone())
            .unwrap_or_else(|| "lewisville-tx".to_string())
    }

    pub fn latitude(&self) -> f64 {
        self.location
            .as_ref()
            .and_then(|l| l.latitude)
            .unwrap_or(33.0462)
    }

    pub fn longitude(&self) -> f64 {
        self.location
            .as_ref()
            .and_then(|l| l.longitude)
            .unwrap_or(-96.9942)
    }

    /// HTTP bind address (default 0.0.0.0:8080).
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }

    /// Allowed CORS origin (default "*").
    pub fn cors_origin(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.cors_origin.clone())
            .unwrap_or_else(|| "*".to_string())
    }

    /// SQLite store path (default "wxfuse.db").
    pub fn store_path(&self) -> String {
        self.store
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| "wxfuse.db".to_string())
    }

    /// Collection cycle interval in seconds (default 1200 = 20 minutes).
    pub fn collect_interval_secs(&self) -> u64 {
        self.collector
            .as_ref()
            .and_then(|c| c.interval_secs)
            .unwrap_or(1200)
    }

    /// Credential for a provider: `<PROVIDER>_API_KEY` env var first,
    /// then the `[providers]` table. `None` means the provider stays
    /// disabled.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        let var = format!("{}_API_KEY", provider.to_uppercase());
        if let Ok(value) = env::var(&var) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        self.providers.get(provider).map(|p| p.api_key.clone())
    }
}
