//! wxfused - collection daemon
//!
//! Coordinates provider fetches, aggregation, and store writes on a
//! fixed interval.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wxfuse_collector::Scheduler;
use wxfuse_config::AppConfig;
use wxfuse_sources::{build_adapters, build_client, Coordinates, SourceCredentials};
use wxfuse_store::StoreClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting wxfuse collector");

    let config = AppConfig::load().context("failed to load configuration")?;
    let location = config.location_id();
    info!(%location, "loaded configuration");

    let store = StoreClient::open(config.store_path())
        .await
        .context("failed to open store")?;
    store.ping().await.context("store ping failed")?;
    info!(path = %config.store_path(), "store ready");

    let http = build_client().context("failed to build HTTP client")?;
    let credentials = SourceCredentials {
        openweathermap: config.api_key("openweathermap"),
        weatherapi: config.api_key("weatherapi"),
        visualcrossing: config.api_key("visualcrossing"),
        tomorrow_io: config.api_key("tomorrow_io"),
    };
    let coords = Coordinates {
        latitude: config.latitude(),
        longitude: config.longitude(),
    };
    let adapters = build_adapters(&credentials, coords, &http);
    for adapter in &adapters {
        info!(source = adapter.id(), "source enabled");
    }

    let interval = Duration::from_secs(config.collect_interval_secs());
    let mut scheduler = Scheduler::new(location, adapters, store, interval);

    info!("collector running - press Ctrl+C to stop");

    tokio::select! {
        result = scheduler.run() => {
            if let Err(e) = result {
                error!("scheduler error: {e}");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("wxfuse collector stopped");
    Ok(())
}
