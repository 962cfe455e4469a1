//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - Type casting
/// - NULL ordering
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Quote a table or column identifier
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Cast a column to string type (for pattern matching on non-text columns)
    ///
    /// - SQLite: `CAST(col AS TEXT)`
    /// - PostgreSQL: `col::TEXT`
    fn cast_to_string(&self, col: &str) -> String;

    /// Generate LIMIT/OFFSET clause from already rendered placeholders
    fn limit_offset(&self, limit: &str, offset: &str) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }

    /// Generate ORDER BY term with NULL handling
    ///
    /// - PostgreSQL: `col DESC NULLS LAST`
    /// - SQLite: emulated with a leading CASE term
    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String;
}
