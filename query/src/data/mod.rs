//! Data layer
//!
//! SQL rendering, query planning and the per-backend repositories that execute
//! search queries.
//!
//! ## Backends
//!
//! | Backend    | Pool         | Repository                 |
//! |------------|--------------|----------------------------|
//! | SQLite     | `SqlitePool` | `SqliteQueryRepository<T>` |
//! | PostgreSQL | `PgPool`     | `PostgresQueryRepository<T>` |
//!
//! Any `T: FromRow` works as the row type; [`Record`] decodes rows without a
//! dedicated struct.

pub mod error;
pub mod plan;
pub mod postgres;
pub mod record;
pub mod sql;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use record::Record;
