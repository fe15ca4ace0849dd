//! Collection cycle orchestration
//!
//! One cycle fetches every configured source, reconciles the survivors
//! into a single aggregated record, and writes it to the store together
//! with its quality score and expiry. A failed source is dropped from
//! the cycle; a cycle with zero surviving sources is fatal and writes
//! nothing.

pub mod scheduler;

pub use scheduler::*;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};
use wxfuse_core::{aggregate, quality_score, Reading};
use wxfuse_sources::SourceAdapter;
use wxfuse_store::{StoreClient, StoreError};

/// Records expire from the store this many days after collection.
pub const RETENTION_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Zero adapters produced a reading; nothing was written.
    #[error("no source produced a reading this cycle")]
    NoSources,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome summary for one successful cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<String>,
    pub quality_score: f64,
}

/// Run one collection cycle: fetch, aggregate, score, store.
pub async fn run_cycle(
    location: &str,
    adapters: &[Arc<dyn SourceAdapter>],
    store: &StoreClient,
) -> Result<CycleReport, CollectError> {
    let readings = fetch_all(adapters).await;
    if readings.is_empty() {
        return Err(CollectError::NoSources);
    }

    let at = Utc::now();
    let record = aggregate(location, &readings, at);
    let score = quality_score(&readings);
    let expiry = at + Duration::days(RETENTION_DAYS);

    store.insert(&record, score, expiry).await?;

    info!(
        location,
        sources = record.sources.len(),
        score,
        "collection cycle stored"
    );
    Ok(CycleReport {
        timestamp: at,
        sources: record.sources,
        quality_score: score,
    })
}

/// Fetch every adapter concurrently. Failures are logged and dropped;
/// one adapter's timeout never cancels its siblings. Reading order
/// follows adapter registration order regardless of completion order.
async fn fetch_all(adapters: &[Arc<dyn SourceAdapter>]) -> Vec<Reading> {
    let mut tasks = JoinSet::new();
    for (index, adapter) in adapters.iter().enumerate() {
        let adapter = Arc::clone(adapter);
        tasks.spawn(async move { (index, adapter.id(), adapter.fetch().await) });
    }

    let mut slots: Vec<Option<Reading>> = Vec::with_capacity(adapters.len());
    slots.resize_with(adapters.len(), || None);

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, id, Ok(reading))) => {
                info!(source = id, "fetched reading");
                slots[index] = Some(reading);
            }
            Ok((_, id, Err(err))) => {
                warn!(source = id, error = %err, "source unavailable, skipping");
            }
            Err(err) => {
                warn!(error = %err, "source task failed");
            }
        }
    }

    slots.into_iter().flatten().collect()
}
