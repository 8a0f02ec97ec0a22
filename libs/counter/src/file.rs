//! Embedded-file counter store backed by SQLite.
//!
//! Every call opens the database file, runs one immediate transaction and
//! closes it again, so each committed increment is on disk when the call
//! returns. The store is a single writer: an async mutex serializes calls
//! made through one instance. Sharing the file between OS processes is not
//! supported.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::validate_name;
use crate::{Cancellation, CounterError, CounterStore};

/// `synchronous` pragma levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Sync at every commit.
    #[default]
    Full,
    /// Sync at checkpoints only.
    Normal,
}

impl SyncMode {
    /// Returns the SQLite pragma value.
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Normal => "NORMAL",
        }
    }
}

/// File store configuration.
#[derive(Debug, Clone)]
pub struct FileCounterConfig {
    /// Path of the database file. Created on first use.
    pub path: PathBuf,

    /// How long to wait on a locked database before failing.
    pub busy_timeout: Duration,

    /// Durability level of each commit.
    pub sync_mode: SyncMode,
}

impl FileCounterConfig {
    /// Configuration with default timeouts for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
            sync_mode: SyncMode::default(),
        }
    }
}

/// Single-writer counter store persisted in an SQLite file.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    config: Arc<FileCounterConfig>,
    writer: Arc<Mutex<()>>,
}

impl FileCounterStore {
    /// Create a store over the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::with_config(FileCounterConfig::new(path.as_ref()))
    }

    /// Create a store from an explicit configuration.
    pub fn with_config(config: FileCounterConfig) -> Self {
        info!(path = %config.path.display(), "Using file counter store");
        Self {
            config: Arc::new(config),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Returns the current value of `name`, or `None` if it was never seeded.
    pub async fn current(&self, name: &str) -> Result<Option<i64>, CounterError> {
        validate_name(name)?;
        let key = name.to_string();
        self.run_blocking(move |conn| read_value(conn, &key)).await
    }

    /// Runs `op` on a fresh connection on the blocking pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, CounterError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, CounterError> + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || {
            let mut conn = open_connection(&config)?;
            op(&mut conn)
        })
        .await
        .map_err(|e| CounterError::Task(e.to_string()))?
    }

    /// Takes the writer lock, giving up if `cancel` fires first.
    async fn lock_writer(
        &self,
        cancel: &Cancellation,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>, CounterError> {
        cancel.check()?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CounterError::Cancelled),
            guard = Arc::clone(&self.writer).lock_owned() => Ok(guard),
        }
    }
}

#[async_trait]
impl CounterStore for FileCounterStore {
    async fn init_seed(
        &self,
        name: &str,
        seed: i64,
        cancel: &Cancellation,
    ) -> Result<(), CounterError> {
        validate_name(name)?;
        let guard = self.lock_writer(cancel).await?;

        let key = name.to_string();
        let cancel = cancel.clone();
        let created = self
            .run_blocking(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let inserted = tx.execute(
                    "INSERT INTO counters (name, value) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
                    params![key, seed],
                )?;
                // Dropping the transaction rolls it back.
                cancel.check()?;
                tx.commit()?;
                Ok(inserted == 1)
            })
            .await?;
        drop(guard);

        if created {
            debug!(counter = %name, seed, "Seeded file counter");
        }
        Ok(())
    }

    async fn increment(&self, name: &str, cancel: &Cancellation) -> Result<i64, CounterError> {
        validate_name(name)?;
        let guard = self.lock_writer(cancel).await?;

        let key = name.to_string();
        let cancel = cancel.clone();
        let value = self
            .run_blocking(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let Some(current) = read_value(&tx, &key)? else {
                    return Err(CounterError::NotInitialized { name: key });
                };
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| CounterError::Overflow { name: key.clone() })?;
                tx.execute(
                    "UPDATE counters SET value = ?2 WHERE name = ?1",
                    params![key, next],
                )?;
                cancel.check()?;
                tx.commit()?;
                Ok(next)
            })
            .await?;
        drop(guard);

        debug!(counter = %name, value, "Incremented file counter");
        Ok(value)
    }
}

/// Opens the database file and makes sure the schema exists.
fn open_connection(config: &FileCounterConfig) -> Result<Connection, CounterError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let conn = Connection::open_with_flags(&config.path, flags)?;
    conn.busy_timeout(config.busy_timeout)?;
    conn.execute_batch(&format!(
        "PRAGMA synchronous = {};",
        config.sync_mode.pragma_value()
    ))?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS counters (
            name  TEXT PRIMARY KEY NOT NULL,
            value INTEGER NOT NULL
        );",
    )?;
    Ok(conn)
}

fn read_value(conn: &Connection, name: &str) -> Result<Option<i64>, CounterError> {
    let value = conn
        .query_row(
            "SELECT value FROM counters WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}
