use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use wxfuse_api::AppState;
use wxfuse_core::{aggregate, Reading};
use wxfuse_store::{QueryEngine, StoreClient};

async fn app_with_store() -> (Router, StoreClient) {
    let store = StoreClient::open_in_memory().await.unwrap();
    let state = Arc::new(AppState {
        query: QueryEngine::new(store.clone()),
        location: "lewisville-tx".to_string(),
        latitude: 33.0462,
        longitude: -96.9942,
        cors_origin: "*".to_string(),
    });
    (wxfuse_api::build_app(state), store)
}

/// Two-source record: temperatures `t` and `t + 2`, so the stored
/// average is `t + 1`.
async fn seed_record(store: &StoreClient, minutes_ago: i64, temperature: f64) {
    let at = Utc::now() - Duration::minutes(minutes_ago);
    let readings = vec![
        Reading {
            temperature: Some(temperature),
            humidity: Some(60.0),
            weather: Some("Clear".to_string()),
            ..Reading::new("openmeteo")
        },
        Reading {
            temperature: Some(temperature + 2.0),
            weather: Some("Clear".to_string()),
            ..Reading::new("weatherapi")
        },
    ];
    let record = aggregate("lewisville-tx", &readings, at);
    store.insert(&record, 0.5, at + Duration::days(30)).await.unwrap();
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn current_is_not_found_when_store_is_empty() {
    let (app, _store) = app_with_store().await;

    let (status, body) = get_json(&app, "/weather/current").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No weather data found");
}

#[tokio::test]
async fn current_serves_the_latest_record() {
    let (app, store) = app_with_store().await;
    seed_record(&store, 30, 20.0).await;
    seed_record(&store, 5, 24.0).await;

    let (status, body) = get_json(&app, "/weather/current").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["location"], "lewisville-tx");
    assert_eq!(body["data_quality_score"], 0.5);
    assert_eq!(
        body["sources"],
        serde_json::json!(["openmeteo", "weatherapi"])
    );

    let conditions = &body["current_conditions"];
    assert_eq!(conditions["temperature"]["value"], 25.0);
    assert_eq!(conditions["temperature"]["min"], 24.0);
    assert_eq!(conditions["temperature"]["max"], 26.0);
    assert_eq!(conditions["temperature"]["unit"], "celsius");
    assert_eq!(conditions["weather"], "Clear");
}

#[tokio::test]
async fn absent_fields_serialize_as_null_values() {
    let (app, store) = app_with_store().await;
    let at = Utc::now() - Duration::minutes(5);
    let readings = vec![Reading {
        temperature: Some(21.0),
        ..Reading::new("openmeteo")
    }];
    let record = aggregate("lewisville-tx", &readings, at);
    store.insert(&record, 0.1, at + Duration::days(30)).await.unwrap();

    let (status, body) = get_json(&app, "/weather/current").await;
    assert_eq!(status, StatusCode::OK);

    let conditions = &body["current_conditions"];
    assert!(conditions["pressure"]["value"].is_null());
    assert!(conditions["uv_index"]["value"].is_null());
    assert_eq!(conditions["weather"], "Unknown");
}

#[tokio::test]
async fn history_returns_newest_first_with_statistics() {
    let (app, store) = app_with_store().await;
    seed_record(&store, 130, 20.0).await; // avg 21
    seed_record(&store, 70, 22.0).await; // avg 23
    seed_record(&store, 10, 24.0).await; // avg 25

    let (status, body) = get_json(&app, "/weather/history?hours=24").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["data_points"], 3);
    assert_eq!(body["period"]["hours"], 24);

    let history = body["history"].as_array().unwrap();
    assert_eq!(history[0]["temperature"], 25.0);
    assert_eq!(history[2]["temperature"], 21.0);
    assert_eq!(history[0]["sources_count"], 2);

    let stats = &body["statistics"]["temperature"];
    assert_eq!(stats["avg"], 23.0);
    assert_eq!(stats["min"], 21.0);
    assert_eq!(stats["max"], 25.0);

    // No reading ever carried pressure.
    assert!(body["statistics"]["pressure"].is_null());
}

#[tokio::test]
async fn history_clamps_hours_to_seven_days() {
    let (app, store) = app_with_store().await;
    seed_record(&store, 10, 20.0).await;

    let (status, body) = get_json(&app, "/weather/history?hours=9999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["hours"], 168);

    let (status, body) = get_json(&app, "/weather/history?hours=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["hours"], 1);
}

#[tokio::test]
async fn history_is_not_found_for_an_empty_window() {
    let (app, _store) = app_with_store().await;

    let (status, body) = get_json(&app, "/weather/history?hours=24").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No historical data found");
}

#[tokio::test]
async fn history_excludes_records_older_than_the_window() {
    let (app, store) = app_with_store().await;
    seed_record(&store, 3 * 60, 20.0).await;
    seed_record(&store, 10, 24.0).await;

    let (status, body) = get_json(&app, "/weather/history?hours=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_points"], 1);
    assert_eq!(body["history"][0]["temperature"], 25.0);
}
