//! Unified error type for data layer
//!
//! This module provides a unified error type that can represent query construction
//! failures and errors from all database backends (SQLite, PostgreSQL).

use thiserror::Error;

use crate::error::QueryError;

/// Unified error type for data layer operations
///
/// This error type wraps backend-specific errors while preserving context
/// about which backend generated the error.
#[derive(Error, Debug)]
pub enum DataError {
    /// Query could not be built; nothing was sent to the database
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// PostgreSQL database error
    #[error("PostgreSQL error: {0}")]
    Postgres(sqlx::Error),
}

impl DataError {
    /// Create a SQLite error with preserved context
    pub fn from_sqlite(e: sqlx::Error) -> Self {
        Self::Sqlite(e)
    }

    /// Create a PostgreSQL error with preserved context
    pub fn from_postgres(e: sqlx::Error) -> Self {
        Self::Postgres(e)
    }

    /// True when the caller's filters, sort or paging were rejected
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) | Self::Postgres(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
            }
            Self::Query(_) => false,
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
            Self::Query(_) => "none",
        }
    }
}
