//! HTTP API for serving aggregated weather data
//!
//! Thin read-path plumbing over the query engine: route handlers map
//! `None` to 404 and store failures to 500, shape the response
//! envelopes, and attach CORS headers. All statistics come from the
//! query engine; nothing is computed here.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use wxfuse_core::{FieldSummary, NumericField, WindowStatistics};
use wxfuse_store::{HistoryWindow, QueryEngine, StoredRecord};

/// History window cap (7 days). Clamping happens here, before the
/// query engine is called.
const MAX_HISTORY_HOURS: i64 = 168;
const DEFAULT_HISTORY_HOURS: i64 = 24;

/// Latest-record age beyond which /health reports degraded.
const FRESHNESS_SECS: i64 = 1800;

pub struct AppState {
    pub query: QueryEngine,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub cors_origin: String,
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/weather/current", get(current))
        .route("/weather/history", get(history))
        .route("/weather/sources", get(sources))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(Arc::clone(&state), cors))
        .with_state(state)
}

async fn cors(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return with_cors_headers(StatusCode::OK.into_response(), &state.cors_origin);
    }
    let response = next.run(request).await;
    with_cors_headers(response, &state.cors_origin)
}

fn with_cors_headers(mut response: Response, origin: &str) -> Response {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Per-field block in the current-conditions envelope. Absent fields
/// serialize as nulls rather than disappearing, so consumers see a
/// stable shape.
#[derive(Debug, Serialize)]
struct Measurement {
    value: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'static str>,
}

impl Measurement {
    fn new(summary: Option<FieldSummary>, unit: Option<&'static str>) -> Self {
        Self {
            value: summary.map(|s| s.avg),
            min: summary.map(|s| s.min),
            max: summary.map(|s| s.max),
            unit,
        }
    }
}

#[derive(Debug, Serialize)]
struct WindBlock {
    speed: Measurement,
    direction: Measurement,
}

#[derive(Debug, Serialize)]
struct CurrentConditions {
    temperature: Measurement,
    feels_like: Measurement,
    humidity: Measurement,
    pressure: Measurement,
    wind: WindBlock,
    clouds: Measurement,
    visibility: Measurement,
    uv_index: Measurement,
    weather: String,
}

#[derive(Debug, Serialize)]
struct CurrentResponse {
    location: String,
    timestamp: String,
    data_quality_score: f64,
    sources: Vec<String>,
    current_conditions: CurrentConditions,
}

impl CurrentResponse {
    fn from_stored(stored: StoredRecord) -> Self {
        let record = &stored.record;
        let summary = |field: NumericField| record.summary(field);
        Self {
            location: stored.location.clone(),
            timestamp: rfc3339(stored.timestamp),
            data_quality_score: stored.quality_score,
            sources: record.sources.clone(),
            current_conditions: CurrentConditions {
                temperature: Measurement::new(summary(NumericField::Temperature), Some("celsius")),
                feels_like: Measurement::new(summary(NumericField::FeelsLike), Some("celsius")),
                humidity: Measurement::new(summary(NumericField::Humidity), Some("percent")),
                pressure: Measurement::new(summary(NumericField::Pressure), Some("hPa")),
                wind: WindBlock {
                    speed: Measurement::new(summary(NumericField::WindSpeed), Some("m/s")),
                    direction: Measurement::new(
                        summary(NumericField::WindDirection),
                        Some("degrees"),
                    ),
                },
                clouds: Measurement::new(summary(NumericField::Clouds), Some("percent")),
                visibility: Measurement::new(summary(NumericField::Visibility), Some("meters")),
                uv_index: Measurement::new(summary(NumericField::UvIndex), None),
                weather: record
                    .weather_consensus
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
            },
        }
    }
}

async fn current(State(state): State<Arc<AppState>>) -> Response {
    match state.query.latest(&state.location).await {
        Ok(Some(stored)) => {
            (StatusCode::OK, Json(CurrentResponse::from_stored(stored))).into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "No weather data found",
            "No weather data available for the specified location",
        ),
        Err(err) => {
            error!(error = %err, "store error serving current weather");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to retrieve weather data",
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    hours: Option<i64>,
}

#[derive(Debug, Serialize)]
struct Period {
    start: String,
    end: String,
    hours: i64,
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    timestamp: String,
    data_quality_score: f64,
    temperature: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    clouds: Option<f64>,
    weather: Option<String>,
    sources_count: usize,
}

impl HistoryEntry {
    fn from_stored(stored: &StoredRecord) -> Self {
        let record = &stored.record;
        let avg = |field: NumericField| record.summary(field).map(|s| s.avg);
        Self {
            timestamp: rfc3339(stored.timestamp),
            data_quality_score: stored.quality_score,
            temperature: avg(NumericField::Temperature),
            humidity: avg(NumericField::Humidity),
            pressure: avg(NumericField::Pressure),
            wind_speed: avg(NumericField::WindSpeed),
            clouds: avg(NumericField::Clouds),
            weather: record.weather_consensus.clone(),
            sources_count: record.sources.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    location: String,
    period: Period,
    data_points: usize,
    statistics: WindowStatistics,
    history: Vec<HistoryEntry>,
}

impl HistoryResponse {
    fn from_window(location: &str, window: HistoryWindow) -> Self {
        Self {
            location: location.to_string(),
            period: Period {
                start: rfc3339(window.start),
                end: rfc3339(window.end),
                hours: window.hours,
            },
            data_points: window.records.len(),
            statistics: window.statistics,
            history: window.records.iter().map(HistoryEntry::from_stored).collect(),
        }
    }
}

async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let hours = params
        .hours
        .unwrap_or(DEFAULT_HISTORY_HOURS)
        .clamp(1, MAX_HISTORY_HOURS);

    match state.query.history(&state.location, hours, Utc::now()).await {
        Ok(Some(window)) => (
            StatusCode::OK,
            Json(HistoryResponse::from_window(&state.location, window)),
        )
            .into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "No historical data found",
            format!("No weather data available for the past {hours} hours"),
        ),
        Err(err) => {
            error!(error = %err, "store error serving history");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Failed to retrieve historical data",
            )
        }
    }
}

async fn sources(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "location": state.location,
            "coordinates": {
                "latitude": state.latitude,
                "longitude": state.longitude,
            },
            "available_sources": wxfuse_sources::catalog(),
            "aggregation_method":
                "Average values from all available sources with consensus for weather conditions",
            "update_schedule": "Every 20 minutes",
            "data_retention": "30 days",
        })),
    )
        .into_response()
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let now = Utc::now();
    match state.query.latest(&state.location).await {
        Ok(latest) => {
            let last_update = latest.as_ref().map(|r| rfc3339(r.timestamp));
            let is_fresh = latest
                .as_ref()
                .map_or(false, |r| (now - r.timestamp).num_seconds() < FRESHNESS_SECS);
            let status = if is_fresh { "healthy" } else { "degraded" };
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": status,
                    "timestamp": rfc3339(now),
                    "location": state.location,
                    "data": {
                        "last_update": last_update,
                        "is_fresh": is_fresh,
                    },
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": err.to_string(),
                    "timestamp": rfc3339(now),
                })),
            )
                .into_response()
        }
    }
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "available_endpoints": [
                "/weather/current",
                "/weather/history?hours=24",
                "/weather/sources",
                "/health",
            ],
        })),
    )
        .into_response()
}
