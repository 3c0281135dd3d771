//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap Diesel-specific errors and convert
//! them to the database-agnostic error types defined in `goalledger_core`.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use goalledger_core::errors::{DatabaseError, Error};
use thiserror::Error;

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These errors are internal to the storage layer and are converted to
/// `goalledger_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A core error raised inside a write job. It passes through the
    /// transaction untouched so conflicts and not-found errors keep their kind.
    #[error(transparent)]
    Core(#[from] Error),
}

/// SQLite reports lock contention as a generic error; the message is the only
/// signal that the busy timeout elapsed.
fn is_busy(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("database is locked") || message.contains("database is busy")
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            // Checking out a connection only fails once the pool's
            // connection timeout has elapsed.
            StorageError::PoolError(e) => Error::Database(DatabaseError::Timeout(e.to_string())),
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => Error::Database(DatabaseError::UniqueViolation(info.message().to_string())),
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) => Error::Database(DatabaseError::ForeignKeyViolation(
                info.message().to_string(),
            )),
            StorageError::QueryFailed(DieselError::DatabaseError(_, info))
                if is_busy(info.message()) =>
            {
                Error::Database(DatabaseError::Timeout(info.message().to_string()))
            }
            StorageError::QueryFailed(DieselError::RollbackTransaction) => Error::Database(
                DatabaseError::TransactionFailed("transaction rolled back".to_string()),
            ),
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::MigrationFailed(e) => Error::Database(DatabaseError::MigrationFailed(e)),
            StorageError::Core(e) => e,
        }
    }
}

/// Extension trait for easily converting Diesel Results to core Results.
///
/// This provides a `.into_core()` method on any `Result<T, diesel::result::Error>`
/// which handles the conversion through StorageError.
pub trait IntoCore<T> {
    fn into_core(self) -> goalledger_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> goalledger_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> goalledger_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalledger_core::goals::GoalError;

    #[test]
    fn core_errors_survive_the_round_trip() {
        let storage: StorageError = Error::from(GoalError::NotFound(7)).into();
        let core: Error = storage.into();
        assert!(matches!(core, Error::Goal(GoalError::NotFound(7))));

        let storage: StorageError =
            Error::from(DatabaseError::EditConflict("goal 7".to_string())).into();
        assert!(Error::from(storage).is_conflict());
    }

    #[test]
    fn diesel_not_found_maps_to_database_not_found() {
        let result: std::result::Result<(), DieselError> = Err(DieselError::NotFound);
        let err = result.into_core().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn lock_contention_is_recognised() {
        assert!(is_busy("database is locked"));
        assert!(is_busy("Database is BUSY"));
        assert!(!is_busy("no such table: goals"));
    }
}
