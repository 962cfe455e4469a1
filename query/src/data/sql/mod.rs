//! SQL abstraction layer for multi-database support
//!
//! This module provides abstractions for generating SQL that works across
//! different database backends (SQLite, PostgreSQL), and the renderer that turns
//! predicates into parameterised queries.

mod dialect;
mod postgres_dialect;
mod render;
mod sqlite_dialect;

pub use dialect::SqlDialect;
pub use postgres_dialect::PostgresDialect;
pub use render::{ResolvedOrder, SqlQuery, render_count, render_select};
pub use sqlite_dialect::SqliteDialect;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Database backend identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Postgres,
}

impl Backend {
    /// Get the SQL dialect for this backend
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Backend::Sqlite => &SqliteDialect,
            Backend::Postgres => &PostgresDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            _ => Err(format!(
                "Invalid backend '{}'. Valid options: sqlite, postgres",
                s
            )),
        }
    }
}
