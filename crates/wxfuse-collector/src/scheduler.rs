//! Periodic collection scheduling

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};
use wxfuse_sources::SourceAdapter;
use wxfuse_store::StoreClient;

use crate::{run_cycle, CollectError};

/// Drives one collection cycle per tick.
///
/// Cycles are only ever triggered from here, one at a time, which is
/// what guarantees at most one concurrent cycle per location.
pub struct Scheduler {
    location: String,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    store: StoreClient,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        location: String,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: StoreClient,
        interval: Duration,
    ) -> Self {
        Self {
            location,
            adapters,
            store,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until the surrounding task is cancelled. A failed
    /// cycle is logged and the scheduler waits for the next tick; store
    /// errors are surfaced the same way rather than aborting the loop.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            location = %self.location,
            sources = self.adapters.len(),
            interval_secs = self.interval.as_secs(),
            "scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match run_cycle(&self.location, &self.adapters, &self.store).await {
                Ok(report) => info!(
                    sources = report.sources.len(),
                    score = report.quality_score,
                    "cycle complete"
                ),
                Err(CollectError::NoSources) => {
                    error!("cycle failed: no source produced a reading");
                }
                Err(err) => {
                    error!(error = %err, "cycle failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scheduler_holds_its_configuration() {
        let store = StoreClient::open_in_memory().await.unwrap();
        let scheduler = Scheduler::new(
            "lewisville-tx".to_string(),
            Vec::new(),
            store,
            Duration::from_secs(1200),
        );
        assert_eq!(scheduler.interval(), Duration::from_secs(1200));
    }
}
