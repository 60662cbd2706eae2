//! Durable registry of tracked restaurant handles, backed by SQLite.
//!
//! The registry is a single key-value table. All queries run through the
//! bounded retry policy in [`retry`]; analytics code never sees a transient
//! storage failure that a retry would have absorbed.

pub mod retry;


use async_trait::async_trait;
use chrono::Utc;
use platewatch_core::{normalize_handle, CoreError, Registry, RegistryError};
use retry::{RetryConfig, RetryExecutor};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const CREATE_TRACKED_TABLE: &str = "
CREATE TABLE IF NOT EXISTS tracked_restaurants (
    handle   TEXT PRIMARY KEY,
    added_at TEXT NOT NULL
)";

pub struct Database {
    pool: SqlitePool,
    retry: RetryExecutor,
}

impl Database {
    /// Open (creating if missing) the SQLite database at `url` and run
    /// migrations.
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| RegistryError::ConnectionFailed {
                reason: format!("invalid database url {url}: {e}"),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| RegistryError::ConnectionFailed {
                reason: e.to_string(),
            })?;
        info!("Connected to registry database at {}", url);

        let db = Self {
            pool,
            retry: RetryExecutor::new(RetryConfig::sqlite()),
        };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::query(CREATE_TRACKED_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|_| RegistryError::MigrationFailed {
                migration: "tracked_restaurants".to_string(),
            })?;
        debug!("Registry migrations are up to date");
        Ok(())
    }

    /// Track a handle. Normalizes first; inserting an already-tracked handle
    /// is a no-op. Returns the normalized handle as stored.
    pub async fn add_restaurant(&self, handle: &str) -> Result<String, CoreError> {
        let normalized = normalize_handle(handle);
        if normalized.len() <= 1 {
            return Err(RegistryError::InvalidHandle {
                handle: handle.to_string(),
            }
            .into());
        }
        self.retry
            .execute("add_restaurant", || async {
                sqlx::query(
                    "INSERT OR IGNORE INTO tracked_restaurants (handle, added_at) VALUES (?1, ?2)",
                )
                .bind(&normalized)
                .bind(Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await
                .map_err(map_sql_error)?;
                Ok(())
            })
            .await?;
        Ok(normalized)
    }

    /// Stop tracking a handle. Returns whether a row was actually removed.
    pub async fn remove_restaurant(&self, handle: &str) -> Result<bool, CoreError> {
        let normalized = normalize_handle(handle);
        self.retry
            .execute("remove_restaurant", || async {
                let result = sqlx::query("DELETE FROM tracked_restaurants WHERE handle = ?1")
                    .bind(&normalized)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sql_error)?;
                Ok(result.rows_affected() > 0)
            })
            .await
    }

    /// All tracked handles, sorted for display.
    pub async fn list_restaurants(&self) -> Result<Vec<String>, CoreError> {
        self.retry
            .execute("list_restaurants", || async {
                let rows = sqlx::query("SELECT handle FROM tracked_restaurants ORDER BY handle")
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sql_error)?;
                rows.iter()
                    .map(|row| row.try_get::<String, _>("handle").map_err(map_sql_error))
                    .collect()
            })
            .await
    }
}

#[async_trait]
impl Registry for Database {
    async fn add(&self, handle: &str) -> Result<String, CoreError> {
        self.add_restaurant(handle).await
    }

    async fn remove(&self, handle: &str) -> Result<bool, CoreError> {
        self.remove_restaurant(handle).await
    }

    async fn list(&self) -> Result<Vec<String>, CoreError> {
        self.list_restaurants().await
    }
}

fn map_sql_error(error: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.message().contains("locked") {
            return RegistryError::DatabaseLocked.into();
        }
    }
    RegistryError::Sql(error).into()
}
