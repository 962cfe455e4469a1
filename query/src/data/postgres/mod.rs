//! PostgreSQL search backend
//!
//! Pool construction for server databases and the PostgreSQL implementation of
//! [`ComplexQueryRepository`](crate::data::traits::ComplexQueryRepository).

mod repository;

pub use repository::PostgresQueryRepository;
pub use sqlx::PgPool;

use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::log::LevelFilter;

use crate::data::error::DataError;

const POSTGRES_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const POSTGRES_STATEMENT_TIMEOUT_SECS: u64 = 30;

/// Open a pool on a PostgreSQL database
///
/// Every connection carries a statement timeout so a runaway search cannot hold it.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, DataError> {
    let options: PgConnectOptions = url.parse().map_err(DataError::from_postgres)?;
    let options = options
        .log_statements(LevelFilter::Trace)
        .options([(
            "statement_timeout",
            format!("{}s", POSTGRES_STATEMENT_TIMEOUT_SECS),
        )]);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(POSTGRES_ACQUIRE_TIMEOUT_SECS))
        .connect_with(options)
        .await
        .map_err(DataError::from_postgres)?;

    tracing::debug!(
        max_connections,
        statement_timeout_secs = POSTGRES_STATEMENT_TIMEOUT_SECS,
        "PostgreSQL pool opened"
    );
    Ok(pool)
}
