use crate::filter::FilterValue;

use super::path::AttributePath;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// Backend-independent predicate tree
///
/// Built fresh per query and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Conjunction in input order; empty matches every row
    And(Vec<Predicate>),
    Compare {
        path: AttributePath,
        op: CompareOp,
        value: FilterValue,
    },
    /// Substring match; `pattern` is already escaped with `escape`
    Like {
        path: AttributePath,
        pattern: String,
        escape: char,
    },
    IsNull(AttributePath),
    IsNotNull(AttributePath),
    In {
        path: AttributePath,
        values: Vec<FilterValue>,
    },
}

impl Predicate {
    /// Predicate without any condition
    pub fn match_all() -> Self {
        Predicate::And(Vec::new())
    }

    /// Combine predicates with AND, keeping their order
    pub fn and(mut predicates: Vec<Predicate>) -> Self {
        if predicates.len() == 1 {
            return predicates.remove(0);
        }
        Predicate::And(predicates)
    }

    pub fn matches_all(&self) -> bool {
        matches!(self, Predicate::And(p) if p.is_empty())
    }

    /// All attribute paths referenced by the tree, depth-first
    pub fn paths(&self) -> Vec<&AttributePath> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a AttributePath>) {
        match self {
            Predicate::And(children) => {
                for child in children {
                    child.collect_paths(out);
                }
            }
            Predicate::Compare { path, .. }
            | Predicate::Like { path, .. }
            | Predicate::In { path, .. }
            | Predicate::IsNull(path)
            | Predicate::IsNotNull(path) => out.push(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn path(column: &str) -> AttributePath {
        AttributePath {
            path: column.to_string(),
            joins: Vec::new(),
            owner: None,
            column: column.to_string(),
            column_type: ColumnType::Integer,
        }
    }

    #[test]
    fn test_and_of_nothing_matches_all() {
        assert!(Predicate::and(Vec::new()).matches_all());
        assert!(Predicate::match_all().matches_all());
    }

    #[test]
    fn test_and_of_one_is_that_predicate() {
        let p = Predicate::IsNull(path("age"));
        assert_eq!(Predicate::and(vec![p.clone()]), p);
    }

    #[test]
    fn test_paths_in_order() {
        let p = Predicate::and(vec![
            Predicate::IsNull(path("a")),
            Predicate::Compare {
                path: path("b"),
                op: CompareOp::Gt,
                value: FilterValue::Int(1),
            },
            Predicate::In {
                path: path("c"),
                values: vec![],
            },
        ]);
        let columns: Vec<&str> = p.paths().iter().map(|p| p.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
    }
}
