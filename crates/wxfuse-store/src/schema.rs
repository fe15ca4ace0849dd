//! Stored row shape and schema bootstrap

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wxfuse_core::AggregatedRecord;

use crate::{StoreError, StoreResult};

/// Timestamps are epoch seconds so range queries compare integers; the
/// full record rides along as JSON.
pub(crate) const CREATE_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS weather_records (
        location TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        record TEXT NOT NULL,
        quality_score REAL NOT NULL,
        expiry INTEGER NOT NULL,
        PRIMARY KEY (location, timestamp)
    )";

pub(crate) const CREATE_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_weather_records_expiry ON weather_records (expiry)";

/// One persisted collection cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub record: AggregatedRecord,
    pub quality_score: f64,
    /// When the store may drop the row; computed by the collector as
    /// cycle time plus the retention window.
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct RecordRow {
    pub location: String,
    pub timestamp: i64,
    pub record: String,
    pub quality_score: f64,
    pub expiry: i64,
}

impl RecordRow {
    pub(crate) fn into_stored(self) -> StoreResult<StoredRecord> {
        let timestamp = DateTime::from_timestamp(self.timestamp, 0)
            .ok_or(StoreError::InvalidTimestamp(self.timestamp))?;
        let expiry = DateTime::from_timestamp(self.expiry, 0)
            .ok_or(StoreError::InvalidTimestamp(self.expiry))?;
        let record: AggregatedRecord = serde_json::from_str(&self.record)?;
        Ok(StoredRecord {
            location: self.location,
            timestamp,
            record,
            quality_score: self.quality_score,
            expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_invalid_timestamp_is_rejected() {
        let row = RecordRow {
            location: "lewisville-tx".to_string(),
            timestamp: i64::MAX,
            record: "{}".to_string(),
            quality_score: 1.0,
            expiry: 0,
        };
        assert!(matches!(
            row.into_stored(),
            Err(StoreError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn row_with_bad_json_is_rejected() {
        let row = RecordRow {
            location: "lewisville-tx".to_string(),
            timestamp: 1_700_000_000,
            record: "not json".to_string(),
            quality_score: 1.0,
            expiry: 1_700_000_000,
        };
        assert!(matches!(row.into_stored(), Err(StoreError::Decode(_))));
    }
}
