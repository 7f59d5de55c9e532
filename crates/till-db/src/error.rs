//! # Database Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error / SnapshotError                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Session (in till-cli)                                                 │
//! │       ├── load failure  → command aborted, nothing changed             │
//! │       └── save failure  → warning printed, in-memory state kept        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::SnapshotError;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A slot payload could not be encoded or decoded.
    #[error("Slot '{slot}' payload is not valid JSON: {source}")]
    Serialization {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Some slots exist but this one does not.
    ///
    /// ## When This Occurs
    /// A save was interrupted by something outside SQLite (a hand-edited
    /// file, a restore from a partial backup). The state is refused rather
    /// than filled in with defaults.
    #[error("Stored state is incomplete: slot '{0}' is missing")]
    MissingSlot(&'static str),

    /// The stored records broke a register rule.
    #[error("Stored state is invalid: {0}")]
    InvalidSnapshot(#[from] SnapshotError),

    /// A legacy export could not be converted.
    #[error("Legacy import failed: {0}")]
    LegacyImport(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub(crate) fn legacy(message: impl Into<String>) -> Self {
        DbError::LegacyImport(message.into())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::MissingSlot("ledger").to_string(),
            "Stored state is incomplete: slot 'ledger' is missing"
        );
        assert_eq!(
            DbError::from(sqlx::Error::PoolTimedOut).to_string(),
            "Connection pool exhausted"
        );
    }
}
