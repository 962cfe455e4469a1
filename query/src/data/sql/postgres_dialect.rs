//! PostgreSQL SQL dialect implementation

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("{}::TEXT", col)
    }

    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String {
        let dir = if desc { "DESC" } else { "ASC" };
        let nulls = if nulls_last {
            "NULLS LAST"
        } else {
            "NULLS FIRST"
        };
        format!("{} {} {}", col, dir, nulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.placeholder(1), "$1");
        assert_eq!(dialect.placeholder(5), "$5");
    }

    #[test]
    fn test_cast_to_string() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.cast_to_string("t0.\"age\""), "t0.\"age\"::TEXT");
    }

    #[test]
    fn test_limit_offset() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.limit_offset("$3", "$4"), "LIMIT $3 OFFSET $4");
    }

    #[test]
    fn test_order_by_with_nulls() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.order_by_with_nulls("timestamp", true, true),
            "timestamp DESC NULLS LAST"
        );
        assert_eq!(
            dialect.order_by_with_nulls("name", false, false),
            "name ASC NULLS FIRST"
        );
    }
}
