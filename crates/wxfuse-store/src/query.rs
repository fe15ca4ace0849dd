//! Read-path query engine
//!
//! Serves the latest-record view and windowed history with summary
//! statistics. Both operations are read-only; `None` models the normal
//! empty-result outcome, distinct from a store failure.

use chrono::{DateTime, Duration, Utc};
use wxfuse_core::{window_statistics, WindowStatistics};

use crate::schema::StoredRecord;
use crate::{StoreClient, StoreResult};

pub struct QueryEngine {
    store: StoreClient,
}

/// One resolved historical window.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hours: i64,
    /// Newest-first, all within `[start, end]`.
    pub records: Vec<StoredRecord>,
    /// Statistics over the per-record averages, computed on demand and
    /// never cached.
    pub statistics: WindowStatistics,
}

impl QueryEngine {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Most recent record for `location`.
    pub async fn latest(&self, location: &str) -> StoreResult<Option<StoredRecord>> {
        self.store.latest(location).await
    }

    /// All records in `[now - hours, now]`, newest-first, plus window
    /// statistics. Assumes `hours` was already clamped by the caller
    /// (the API handler caps it at 168).
    pub async fn history(
        &self,
        location: &str,
        hours: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<HistoryWindow>> {
        let start = now - Duration::hours(hours);
        let records = self.store.range(location, start, now).await?;
        if records.is_empty() {
            return Ok(None);
        }

        let statistics = window_statistics(records.iter().map(|r| &r.record));
        Ok(Some(HistoryWindow {
            start,
            end: now,
            hours,
            records,
            statistics,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wxfuse_core::{aggregate, Reading};

    async fn seeded_store(now: DateTime<Utc>) -> StoreClient {
        let store = StoreClient::open_in_memory().await.unwrap();
        // One record per hour going back 30 hours.
        for hours_ago in 0..30 {
            let at = now - Duration::hours(hours_ago);
            let reading = Reading {
                temperature: Some(20.0 + hours_ago as f64),
                humidity: Some(60.0),
                ..Reading::new("openmeteo")
            };
            let record = aggregate("lewisville-tx", &[reading], at);
            store
                .insert(&record, 1.0, at + Duration::days(30))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn history_never_returns_records_outside_the_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let engine = QueryEngine::new(seeded_store(now).await);

        let window = engine
            .history("lewisville-tx", 24, now)
            .await
            .unwrap()
            .unwrap();

        // 25 records fall inside an inclusive 24-hour window.
        assert_eq!(window.records.len(), 25);
        assert!(window
            .records
            .iter()
            .all(|r| r.timestamp >= window.start && r.timestamp <= window.end));

        // Newest-first ordering.
        let timestamps: Vec<_> = window.records.iter().map(|r| r.timestamp).collect();
        let mut sorted = timestamps.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(timestamps, sorted);
    }

    #[tokio::test]
    async fn history_statistics_summarize_the_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let engine = QueryEngine::new(seeded_store(now).await);

        let window = engine
            .history("lewisville-tx", 2, now)
            .await
            .unwrap()
            .unwrap();

        // Temperatures 20, 21, 22 in the 2-hour window.
        let temp = window.statistics.temperature.unwrap();
        assert_eq!(temp.avg, 21.0);
        assert_eq!(temp.min, 20.0);
        assert_eq!(temp.max, 22.0);

        // Pressure never contributed; it is absent, not zero.
        assert!(window.statistics.pressure.is_none());
    }

    #[tokio::test]
    async fn empty_window_is_not_found() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let engine = QueryEngine::new(StoreClient::open_in_memory().await.unwrap());

        assert!(engine
            .history("lewisville-tx", 24, now)
            .await
            .unwrap()
            .is_none());
        assert!(engine.latest("lewisville-tx").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_returns_the_newest_record() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let engine = QueryEngine::new(seeded_store(now).await);

        let stored = engine.latest("lewisville-tx").await.unwrap().unwrap();
        assert_eq!(stored.timestamp, now);
        assert_eq!(stored.record.temperature.unwrap().avg, 20.0);
    }
}
