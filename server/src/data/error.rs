//! Error type for the data layer
//!
//! Wraps backend errors and classifies SQLite lock contention so callers
//! can decide whether an operation is worth retrying.

use thiserror::Error;

/// SQLite primary result codes for lock contention
const SQLITE_BUSY: u32 = 5;
const SQLITE_LOCKED: u32 = 6;

/// Error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Another connection holds the lock (SQLITE_BUSY / SQLITE_LOCKED)
    #[error("Database is locked: {0}")]
    Locked(String),

    /// Migration failed
    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DataError {
    /// Classify a raw sqlx error
    pub fn from_sqlite(e: sqlx::Error) -> Self {
        if is_lock_error(&e) {
            return Self::Locked(e.to_string());
        }
        if let sqlx::Error::Database(db) = &e
            && db.is_unique_violation()
        {
            return Self::Conflict(db.message().to_string());
        }
        Self::Sqlite(e)
    }

    /// Lock contention; the same statement may succeed on a later attempt
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

fn is_lock_error(e: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db) = e else {
        return false;
    };
    let by_code = db
        .code()
        .and_then(|code| code.parse::<u32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false);
    by_code || db.message().contains("database is locked")
}

/// Convert from the SQLite backend error type
impl From<crate::data::sqlite::SqliteError> for DataError {
    fn from(e: crate::data::sqlite::SqliteError) -> Self {
        match e {
            crate::data::sqlite::SqliteError::Database(e) => Self::from_sqlite(e),
            crate::data::sqlite::SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            crate::data::sqlite::SqliteError::Io(e) => Self::Io(e),
            crate::data::sqlite::SqliteError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteError;

    #[test]
    fn test_migration_failed_error_display() {
        let err = DataError::MigrationFailed {
            version: 2,
            name: "add_units".to_string(),
            error: "syntax error".to_string(),
        };
        assert_eq!(err.to_string(), "Migration 2 (add_units) failed: syntax error");
    }

    #[test]
    fn test_locked_is_retryable() {
        let err = DataError::Locked("database is locked".into());
        assert!(err.is_locked());
    }

    #[test]
    fn test_other_errors_not_locked() {
        assert!(!DataError::Conflict("dup".into()).is_locked());
        assert!(!DataError::Sqlite(sqlx::Error::RowNotFound).is_locked());
        assert!(!DataError::Sqlite(sqlx::Error::PoolTimedOut).is_locked());
    }

    #[test]
    fn test_conflict_passthrough() {
        let err: DataError = SqliteError::Conflict("Username already exists".into()).into();
        assert!(matches!(err, DataError::Conflict(ref m) if m == "Username already exists"));
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (name TEXT UNIQUE)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap();
        let e = sqlx::query("INSERT INTO t VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(matches!(DataError::from_sqlite(e), DataError::Conflict(_)));
    }
}
