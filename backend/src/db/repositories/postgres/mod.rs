//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry with exponential backoff for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::config::PostgresSettings;
use crate::db::repository::{PredictionRepository, RepositoryError, RepositoryResult, RetryPolicy};
use crate::models::{Prediction, StoredPrediction};

mod models;
mod schema;

use models::{NewPredictionRow, PredictionRow};
use schema::predictions;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_settings(&PostgresSettings::default())
    }
}

impl PostgresConfig {
    /// Pool configuration from the `[postgres]` section, with `PG_*`
    /// environment variables taking precedence.
    pub fn from_settings(settings: &PostgresSettings) -> Self {
        fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(fallback)
        }

        Self {
            database_url: settings.database_url.clone(),
            max_pool_size: env_or("PG_POOL_MAX", settings.max_connections),
            min_pool_size: env_or("PG_POOL_MIN", settings.min_connections),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", settings.connect_timeout),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", settings.idle_timeout),
            max_retries: env_or("PG_MAX_RETRIES", settings.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", settings.retry_delay_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed prediction repository.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresRepository {
    /// Build the pool and apply pending migrations. Blocks.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        if config.database_url.is_empty() {
            return Err(RepositoryError::configuration(
                "Postgres repository requires a database URL",
            ));
        }

        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection(e.to_string())
                    .in_operation("create_pool")
                    .with_details(format!("max_size={}", config.max_pool_size))
            })?;

        {
            let mut pooled = pool
                .get()
                .map_err(|e| RepositoryError::from(e).in_operation("run_migrations"))?;
            let conn: &mut PgConnection = &mut pooled;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal(format!("Migration failed: {}", e))
                    .in_operation("run_migrations")
            })?;
        }

        let retry = config.retry_policy();
        log::info!(
            "Postgres repository ready (pool max {}, up to {} attempts per operation)",
            config.max_pool_size,
            retry.max_attempts()
        );
        Ok(Self { pool, retry })
    }

    /// Run `f` on a pooled connection on the blocking pool, retrying
    /// transient failures per the configured policy.
    async fn with_conn<T, F>(&self, operation: &'static str, mut f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnMut(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let retry = self.retry;

        task::spawn_blocking(move || {
            retry.run(std::thread::sleep, |_attempt| {
                let mut conn = pool.get()?;
                f(&mut conn)
            })
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
        .map_err(|e| e.in_operation(operation))
    }
}

#[async_trait]
impl PredictionRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    async fn insert_many(&self, batch: &[Prediction]) -> RepositoryResult<usize> {
        let rows = batch
            .iter()
            .map(NewPredictionRow::try_from)
            .collect::<RepositoryResult<Vec<_>>>()
            .map_err(|e| e.in_operation("insert_many"))?;
        if rows.is_empty() {
            return Ok(0);
        }

        let batch_len = rows.len();
        self.with_conn("insert_many", move |conn| {
            let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::insert_into(predictions::table)
                    .values(&rows)
                    .execute(conn)
            })?;
            Ok(inserted)
        })
        .await
        .map_err(|e| e.with_details(format!("batch={batch_len}")))
    }

    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<StoredPrediction>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .with_conn("list_recent", move |conn| {
                Ok(predictions::table
                    .order((predictions::created_at.desc(), predictions::id.desc()))
                    .limit(limit)
                    .select(PredictionRow::as_select())
                    .load::<PredictionRow>(conn)?)
            })
            .await?;

        rows.into_iter()
            .map(|row| StoredPrediction::try_from(row).map_err(|e| e.in_operation("list_recent")))
            .collect()
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let total: i64 = self
            .with_conn("count", |conn| Ok(predictions::table.count().get_result(conn)?))
            .await?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}
