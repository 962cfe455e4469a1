//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("CAST({} AS TEXT)", col)
    }

    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String {
        // Older SQLite builds lack NULLS FIRST/LAST, emulate with CASE
        let dir = if desc { "DESC" } else { "ASC" };
        if nulls_last {
            format!(
                "CASE WHEN {} IS NULL THEN 1 ELSE 0 END, {} {}",
                col, col, dir
            )
        } else {
            format!(
                "CASE WHEN {} IS NULL THEN 0 ELSE 1 END, {} {}",
                col, col, dir
            )
        }
    }
}
