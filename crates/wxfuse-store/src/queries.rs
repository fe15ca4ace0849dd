//! Query operations on the record table

use chrono::{DateTime, Utc};
use tracing::debug;
use wxfuse_core::AggregatedRecord;

use crate::schema::{RecordRow, StoredRecord};
use crate::{StoreClient, StoreResult};

impl StoreClient {
    /// Write one cycle's record. Expired rows are swept first, so
    /// retention is enforced on every write rather than by a separate
    /// janitor.
    pub async fn insert(
        &self,
        record: &AggregatedRecord,
        quality_score: f64,
        expiry: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.purge_expired(record.timestamp).await?;

        let payload = serde_json::to_string(record)?;
        sqlx::query(
            "INSERT INTO weather_records (location, timestamp, record, quality_score, expiry)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.location)
        .bind(record.timestamp.timestamp())
        .bind(payload)
        .bind(quality_score)
        .bind(expiry.timestamp())
        .execute(self.pool())
        .await?;

        debug!(
            location = %record.location,
            timestamp = record.timestamp.timestamp(),
            "stored aggregated record"
        );
        Ok(())
    }

    /// Most recent record for `location`, or `None` when the store holds
    /// nothing for it.
    pub async fn latest(&self, location: &str) -> StoreResult<Option<StoredRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT location, timestamp, record, quality_score, expiry
             FROM weather_records
             WHERE location = ?
             ORDER BY timestamp DESC
             LIMIT 1",
        )
        .bind(location)
        .fetch_optional(self.pool())
        .await?;

        row.map(RecordRow::into_stored).transpose()
    }

    /// Records with `start <= timestamp <= end`, newest-first.
    pub async fn range(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT location, timestamp, record, quality_score, expiry
             FROM weather_records
             WHERE location = ? AND timestamp >= ? AND timestamp <= ?
             ORDER BY timestamp DESC",
        )
        .bind(location)
        .bind(start.timestamp())
        .bind(end.timestamp())
        .fetch_all(self.pool())
        .await?;

        debug!(
            location,
            count = rows.len(),
            "retrieved records for range query"
        );
        rows.into_iter().map(RecordRow::into_stored).collect()
    }

    /// Drop rows whose expiry has passed. Returns the number removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM weather_records WHERE expiry <= ?")
            .bind(now.timestamp())
            .execute(self.pool())
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            debug!(removed, "swept expired records");
        }
        Ok(removed)
    }

    /// Count of stored records for `location`.
    pub async fn count(&self, location: &str) -> StoreResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM weather_records WHERE location = ?")
                .bind(location)
                .fetch_one(self.pool())
                .await?;
        Ok(count.0)
    }
}
