//! Data layer error type

use thiserror::Error;

use crate::data::sqlite::SqliteError;

/// Error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

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

    /// Unique constraint hit (duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<SqliteError> for DataError {
    fn from(e: SqliteError) -> Self {
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            SqliteError::Io(e) => Self::Io(e),
            SqliteError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failed_from_sqlite_error() {
        let err: DataError = SqliteError::MigrationFailed {
            version: 2,
            name: "add_posts_table".to_string(),
            error: "syntax error".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Migration 2 (add_posts_table) failed: syntax error"
        );
    }

    #[test]
    fn test_conflict_from_sqlite_error() {
        let err: DataError = SqliteError::Conflict("email taken".to_string()).into();
        assert!(matches!(err, DataError::Conflict(msg) if msg == "email taken"));
    }

    #[test]
    fn test_database_error_keeps_source() {
        let err: DataError = SqliteError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, DataError::Sqlite(sqlx::Error::PoolClosed)));
    }
}
