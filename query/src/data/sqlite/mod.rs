//! SQLite search backend
//!
//! Pool construction for local/embedded databases and the SQLite implementation of
//! [`ComplexQueryRepository`](crate::data::traits::ComplexQueryRepository).

mod repository;

pub use repository::SqliteQueryRepository;
pub use sqlx::SqlitePool;

use std::str::FromStr;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::data::error::DataError;

const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

/// Open a pool on an existing SQLite database
///
/// Accepts `sqlite:` URLs as well as plain file paths. The database is not created
/// when missing.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, DataError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(DataError::from_sqlite)?
        .create_if_missing(false)
        .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
        .log_statements(tracing::log::LevelFilter::Trace);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(DataError::from_sqlite)?;

    tracing::debug!(url = %url, "SQLite pool opened");
    Ok(pool)
}
