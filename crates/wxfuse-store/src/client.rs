//! Store client and connection management

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::schema::{CREATE_EXPIRY_INDEX, CREATE_TABLE};
use crate::StoreResult;

/// Store client wrapping an sqlx connection pool.
#[derive(Clone)]
pub struct StoreClient {
    pool: SqlitePool,
}

impl StoreClient {
    /// Open (or create) the store at `path` and bootstrap the schema.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(opts)
            .await?;
        Self::bootstrap(pool).await
    }

    /// In-memory store for tests. A single connection keeps every handle
    /// on the same database.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let opts = SqliteConnectOptions::new().filename(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        Self::bootstrap(pool).await
    }

    async fn bootstrap(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_EXPIRY_INDEX).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Reference to the underlying pool for direct queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Test the store connection.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
