//! # Database Handle
//!
//! Opens the SQLite file that holds the register and hands out the state
//! repository.
//!
//! ## Opening Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path)            DbConfig::in_memory()  (tests)          │
//! │       │                                  │                              │
//! │       └──────────────┬───────────────────┘                              │
//! │                      ▼                                                  │
//! │  Database::new(config)                                                  │
//! │       ├── connect options: create file, WAL, NORMAL sync, busy wait     │
//! │       ├── pool (2 connections; 1 pinned for in-memory)                  │
//! │       └── embedded migrations                                           │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  db.register_state().load_register() / .save(&snapshot)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL journaling keeps a crashed save from corrupting the previous state:
//! an interrupted transaction is simply discarded on next open.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::register::RegisterStateRepository;

/// Where the register lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A database file, created on first open.
    File(PathBuf),
    /// A private in-memory database, gone when the handle is closed.
    Memory,
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Pool size. The CLI runs one operation at a time, so two is plenty.
    pub max_connections: u32,

    /// How long to wait for a connection, or for another process holding
    /// the file lock.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// A database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 2,
            busy_timeout: Duration::from_secs(30),
        }
    }

    /// An in-memory database, for tests.
    ///
    /// Every SQLite connection to `:memory:` sees its own empty database, so
    /// the pool is held at exactly one connection that never expires.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle over the SQLite pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let options = match &config.location {
            DbLocation::File(path) => {
                info!(path = %path.display(), "Opening register database");
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    // May lose the last save on power loss, never corrupts
                    .synchronous(SqliteSynchronous::Normal)
            }
            DbLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        }
        .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(if config.location == DbLocation::Memory { 1 } else { 0 })
            .acquire_timeout(config.busy_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the register state repository.
    pub fn register_state(&self) -> RegisterStateRepository {
        RegisterStateRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later operations fail with a closed pool.
    pub async fn close(&self) {
        info!("Closing register database");
        self.pool.close().await;
    }
}
