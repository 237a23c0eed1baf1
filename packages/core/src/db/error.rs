//! Database Error Types
//!
//! `DatabaseError` covers connection, initialization and SQL execution
//! failures. `RepositoryError` wraps it and adds the repository contract
//! failures that are neither "not found" nor "nothing persisted" (both of
//! those are reported as `Ok(None)`).

use std::path::PathBuf;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish database connection
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize database schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Permission denied when accessing database
    #[error("Permission denied for database path: {path}")]
    PermissionDenied { path: PathBuf },

    /// Failed to create parent directory
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },
}

impl DatabaseError {
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }
}

/// Repository contract errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Underlying store failure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// A stored row could not be converted into a record
    #[error("Failed to read {table} row: {source:#}")]
    RowMapping {
        table: &'static str,
        source: anyhow::Error,
    },

    /// More than one active row shares a key that must be unique
    #[error("Invariant violated: {count} active {table} rows share id {id}")]
    InvariantViolation {
        table: &'static str,
        id: i64,
        count: usize,
    },

    /// Insert was asked for a record whose key is already assigned
    #[error("{table} record {id} already has a key and cannot be inserted")]
    KeyAlreadyAssigned { table: &'static str, id: i64 },

    /// Update or delete was asked for a record that was never saved
    #[error("{table} record has no key; insert it first")]
    KeyNotAssigned { table: &'static str },

    /// Update or delete was asked for a record the caller has not marked as edited
    #[error("{table} record {id} is not marked as edited; nothing to write")]
    UnmodifiedRecord { table: &'static str, id: i64 },

    /// Delete was asked for a record whose status is still active
    #[error("{table} record {id} must be marked deleted before it is deleted")]
    DeleteNotMarked { table: &'static str, id: i64 },
}

impl RepositoryError {
    pub fn row_mapping(table: &'static str, source: anyhow::Error) -> Self {
        Self::RowMapping { table, source }
    }

    /// True for errors caused by how the caller prepared the record
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::KeyAlreadyAssigned { .. }
                | Self::KeyNotAssigned { .. }
                | Self::UnmodifiedRecord { .. }
                | Self::DeleteNotMarked { .. }
        )
    }
}

impl From<libsql::Error> for RepositoryError {
    fn from(err: libsql::Error) -> Self {
        Self::Database(DatabaseError::LibsqlError(err))
    }
}
