//! wxfuse-api - HTTP server for aggregated weather data

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wxfuse_api::AppState;
use wxfuse_config::AppConfig;
use wxfuse_store::{QueryEngine, StoreClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let store = StoreClient::open(config.store_path())
        .await
        .context("failed to open store")?;
    store.ping().await.context("store ping failed")?;

    let state = Arc::new(AppState {
        query: QueryEngine::new(store),
        location: config.location_id(),
        latitude: config.latitude(),
        longitude: config.longitude(),
        cors_origin: config.cors_origin(),
    });
    let app = wxfuse_api::build_app(state);

    let addr: SocketAddr = config
        .http_bind()
        .parse()
        .context("invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
