//! Networked counter store backed by PostgreSQL.
//!
//! Sequences are rows in a `counters` table. Increments are a single
//! `UPDATE ... RETURNING` statement, so the server applies them atomically
//! and any number of processes may share the table. `increment` never
//! creates a row; a missing row is reported as not initialized.
//!
//! Every call runs in an explicit transaction. Cancellation can interrupt
//! the statement, but `COMMIT` is the commit point and is never raced: a
//! call that reports `Cancelled` has not changed the table.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};

use crate::error::validate_name;
use crate::{Cancellation, CounterError, CounterStore};

/// Postgres error code for numeric values out of range.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Database configuration.
#[derive(Debug, Clone)]
pub struct PgCounterConfig {
    /// Database connection URL.
    pub database_url: String,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Minimum number of idle connections.
    pub min_connections: u32,

    /// Connection acquire timeout.
    pub acquire_timeout: Duration,

    /// Idle connection timeout.
    pub idle_timeout: Duration,

    /// Maximum lifetime of a connection.
    pub max_lifetime: Duration,
}

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/seqid";

impl Default for PgCounterConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl PgCounterConfig {
    /// Reads `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `DB_MIN_CONNECTIONS`.
    ///
    /// Unset or unparsable values keep their defaults. Provided for
    /// embedding applications; the store itself never reads the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pool_size = |key: &str, fallback: u32| {
            lookup(key)
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            max_connections: pool_size("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: pool_size("DB_MIN_CONNECTIONS", defaults.min_connections),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            ..defaults
        }
    }
}

/// Multi-writer counter store over a Postgres pool.
///
/// This is the networked backend: many processes may seed and increment the
/// same sequences, each increment applied atomically by the database server.
#[derive(Debug, Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new connection pool and wrap it.
    pub async fn connect(config: &PgCounterConfig) -> Result<Self, CounterError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to counter database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect(&config.database_url)
            .await
            .map_err(CounterError::Connect)?;

        info!("Counter database connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `counters` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), CounterError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counters (
                name  TEXT PRIMARY KEY,
                value BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(CounterError::Query)?;
        Ok(())
    }

    /// Returns the current value of `name`, or `None` if it was never seeded.
    pub async fn current(&self, name: &str) -> Result<Option<i64>, CounterError> {
        validate_name(name)?;
        let row = sqlx::query("SELECT value FROM counters WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(CounterError::Query)?;
        row.map(|r| r.try_get::<i64, _>("value"))
            .transpose()
            .map_err(CounterError::Query)
    }
}

impl PgCounterStore {
    /// Opens a transaction, giving up if `cancel` fires first.
    async fn begin(
        &self,
        cancel: &Cancellation,
    ) -> Result<Transaction<'static, Postgres>, CounterError> {
        cancel.check()?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CounterError::Cancelled),
            tx = self.pool.begin() => tx.map_err(CounterError::Query),
        }
    }

    /// Commits unless `cancel` has fired.
    ///
    /// Dropping the uncommitted transaction rolls it back.
    async fn commit(
        tx: Transaction<'static, Postgres>,
        cancel: &Cancellation,
    ) -> Result<(), CounterError> {
        cancel.check()?;
        tx.commit().await.map_err(CounterError::Query)
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn init_seed(
        &self,
        name: &str,
        seed: i64,
        cancel: &Cancellation,
    ) -> Result<(), CounterError> {
        validate_name(name)?;
        let mut tx = self.begin(cancel).await?;

        let insert = sqlx::query(
            r#"
            INSERT INTO counters (name, value)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(seed)
        .execute(&mut *tx);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CounterError::Cancelled),
            result = insert => result.map_err(CounterError::Query)?,
        };
        Self::commit(tx, cancel).await?;

        if result.rows_affected() == 1 {
            debug!(counter = %name, seed, "Seeded database counter");
        }
        Ok(())
    }

    async fn increment(&self, name: &str, cancel: &Cancellation) -> Result<i64, CounterError> {
        validate_name(name)?;
        let mut tx = self.begin(cancel).await?;

        let update = sqlx::query(
            r#"
            UPDATE counters
            SET value = value + 1
            WHERE name = $1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *tx);

        let row = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CounterError::Cancelled),
            row = update => row.map_err(|e| map_increment_error(name, e))?,
        };

        let Some(row) = row else {
            return Err(CounterError::NotInitialized {
                name: name.to_string(),
            });
        };
        let value: i64 = row.try_get("value").map_err(CounterError::Query)?;
        Self::commit(tx, cancel).await?;

        debug!(counter = %name, value, "Incremented database counter");
        Ok(value)
    }
}

fn map_increment_error(name: &str, e: sqlx::Error) -> CounterError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return CounterError::Overflow {
                name: name.to_string(),
            };
        }
    }
    CounterError::Query(e)
}
