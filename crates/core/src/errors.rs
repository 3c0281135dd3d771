//! Core error types for goalledger.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use std::collections::BTreeMap;

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::goals::GoalError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for goalledger.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Goal error: {0}")]
    Goal(#[from] GoalError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the error is a version mismatch on a compare-and-swap write,
    /// either from a single attempt or after the retry budget ran out.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::EditConflict(_))
                | Error::Goal(GoalError::ReconciliationConflict { .. })
        )
    }

    /// True for absent, soft-deleted or foreign records.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::NotFound(_))
                | Error::Goal(GoalError::NotFound(_))
                | Error::Goal(GoalError::ProgressNotFound(_))
        )
    }

    /// True for timeouts and connection failures. These are surfaced to the
    /// caller and never retried by the reconciliation loop.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::Timeout(_))
                | Error::Database(DatabaseError::ConnectionFailed(_))
        )
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A conditional update matched no row: the version moved on, the record
    /// was deleted, or it never existed.
    #[error("Edit conflict: {0}")]
    EditConflict(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// The store did not answer within the operation deadline.
    #[error("Database operation timed out: {0}")]
    Timeout(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid fields: {}", format_fields(.0))]
    Fields(BTreeMap<String, String>),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

fn format_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field} {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects per-field validation failures so they can be reported together.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless `ok` holds. The first message for
    /// a field wins.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(ValidationError::Fields(self.errors)))
        }
    }
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Database(DatabaseError::Internal(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.check(false, "name", "must be provided");
        errors.check(false, "name", "must not be more than 500 bytes long");
        errors.check(true, "color", "must be provided");

        let err = errors.into_result().unwrap_err();
        match err {
            Error::Validation(ValidationError::Fields(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields["name"], "must be provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn classifies_conflicts_and_transient_failures() {
        let conflict = Error::Database(DatabaseError::EditConflict("goal 1".into()));
        assert!(conflict.is_conflict());
        assert!(!conflict.is_transient());

        let exhausted = Error::Goal(GoalError::ReconciliationConflict {
            goal_id: 1,
            attempts: 3,
        });
        assert!(exhausted.is_conflict());

        let timeout = Error::Database(DatabaseError::Timeout("3s".into()));
        assert!(timeout.is_transient());
        assert!(!timeout.is_conflict());

        assert!(Error::Goal(GoalError::NotFound(7)).is_not_found());
    }
}
