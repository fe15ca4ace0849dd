//! Time-series store for aggregated weather records
//!
//! SQLite-backed append-only series, one row per collection cycle keyed
//! by `(location, timestamp)`. Rows carry their own expiry and the store
//! sweeps them on write; no separate janitor process is involved. The
//! [`QueryEngine`] sits on top for the read path.

pub mod client;
pub mod queries;
pub mod query;
pub mod schema;

pub use client::*;
pub use query::*;
pub use schema::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("stored record carries invalid timestamp {0}")]
    InvalidTimestamp(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;
