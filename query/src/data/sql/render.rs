//! Predicate to SQL rendering
//!
//! Produces one SELECT (or COUNT) over the root table aliased `t0`, with a LEFT JOIN per
//! distinct relation path in first-use order (`t1`, `t2`, ...). Every filter value becomes
//! a bound parameter, limit and offset last; identifiers come from the schema registry only.

use crate::constants::ROOT_TABLE_ALIAS;
use crate::data::types::{Direction, NullHandling};
use crate::filter::FilterValue;
use crate::predicate::{AttributePath, Predicate};
use crate::schema::{ColumnType, EntitySchema};

use super::SqlDialect;

/// Rendered SQL with its parameters in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<FilterValue>,
}

/// Sort term with its attribute path already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOrder {
    pub path: AttributePath,
    pub direction: Direction,
    pub null_handling: NullHandling,
}

/// Render `SELECT t0.* ...` with optional ordering and a `(limit, offset)` window
pub fn render_select(
    dialect: &dyn SqlDialect,
    entity: &EntitySchema,
    predicate: &Predicate,
    orders: &[ResolvedOrder],
    window: Option<(u32, u64)>,
) -> SqlQuery {
    let mut renderer = Renderer::new(dialect);
    let where_clause = renderer.where_clause(predicate);
    let order_terms: Vec<String> = orders.iter().map(|o| renderer.order(o)).collect();

    let mut sql = format!(
        "SELECT {}.* FROM {}",
        ROOT_TABLE_ALIAS,
        renderer.from_clause(entity)
    );
    if let Some(where_clause) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(&where_clause);
    }
    if !order_terms.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_terms.join(", "));
    }
    if let Some((limit, offset)) = window {
        let limit = renderer.bind(FilterValue::Int(limit.into()));
        let offset = renderer.bind(FilterValue::Int(i64::try_from(offset).unwrap_or(i64::MAX)));
        sql.push(' ');
        sql.push_str(&dialect.limit_offset(&limit, &offset));
    }

    renderer.finish(sql)
}

/// Render `SELECT COUNT(*) ...` over the same joins and condition
pub fn render_count(
    dialect: &dyn SqlDialect,
    entity: &EntitySchema,
    predicate: &Predicate,
) -> SqlQuery {
    let mut renderer = Renderer::new(dialect);
    let where_clause = renderer.where_clause(predicate);

    let mut sql = format!("SELECT COUNT(*) FROM {}", renderer.from_clause(entity));
    if let Some(where_clause) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(&where_clause);
    }

    renderer.finish(sql)
}

struct Renderer<'a> {
    dialect: &'a dyn SqlDialect,
    /// Join path to alias, in first-use order
    aliases: Vec<(String, String)>,
    joins: Vec<String>,
    params: Vec<FilterValue>,
}

impl<'a> Renderer<'a> {
    fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            aliases: Vec::new(),
            joins: Vec::new(),
            params: Vec::new(),
        }
    }

    fn finish(self, sql: String) -> SqlQuery {
        tracing::trace!(
            dialect = self.dialect.name(),
            sql = %sql,
            params = self.params.len(),
            "Rendered query"
        );
        SqlQuery {
            sql,
            params: self.params,
        }
    }

    fn from_clause(&self, entity: &EntitySchema) -> String {
        let mut from = format!(
            "{} {}",
            self.dialect.quote_identifier(&entity.table),
            ROOT_TABLE_ALIAS
        );
        for join in &self.joins {
            from.push(' ');
            from.push_str(join);
        }
        from
    }

    fn where_clause(&mut self, predicate: &Predicate) -> Option<String> {
        if predicate.matches_all() {
            None
        } else {
            Some(self.predicate(predicate))
        }
    }

    fn alias_of(&self, path: Option<&str>) -> &str {
        match path {
            None => ROOT_TABLE_ALIAS,
            Some(path) => self
                .aliases
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, alias)| alias.as_str())
                .unwrap_or(ROOT_TABLE_ALIAS),
        }
    }

    /// Register the joins of `path` and return its qualified column
    fn column(&mut self, path: &AttributePath) -> String {
        for join in &path.joins {
            if self.aliases.iter().any(|(p, _)| *p == join.path) {
                continue;
            }
            let alias = format!("t{}", self.aliases.len() + 1);
            let parent = self.alias_of(join.parent.as_deref()).to_string();
            self.joins.push(format!(
                "LEFT JOIN {} {} ON {}.{} = {}.{}",
                self.dialect.quote_identifier(&join.table),
                alias,
                alias,
                self.dialect.quote_identifier(&join.references),
                parent,
                self.dialect.quote_identifier(&join.column),
            ));
            self.aliases.push((join.path.clone(), alias));
        }

        format!(
            "{}.{}",
            self.alias_of(path.owner.as_deref()),
            self.dialect.quote_identifier(&path.column)
        )
    }

    fn bind(&mut self, value: FilterValue) -> String {
        self.params.push(value);
        self.dialect.placeholder(self.params.len())
    }

    fn predicate(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::And(children) => {
                if children.is_empty() {
                    return "1=1".to_string();
                }
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| match child {
                        Predicate::And(inner) if inner.len() > 1 => {
                            format!("({})", self.predicate(child))
                        }
                        _ => self.predicate(child),
                    })
                    .collect();
                parts.join(" AND ")
            }
            Predicate::Compare { path, op, value } => {
                let column = self.column(path);
                let placeholder = self.bind(value.clone());
                format!("{} {} {}", column, op.as_sql(), placeholder)
            }
            Predicate::Like {
                path,
                pattern,
                escape,
            } => {
                let column = self.column(path);
                let target = if path.column_type == ColumnType::Text {
                    column
                } else {
                    self.dialect.cast_to_string(&column)
                };
                let placeholder = self.bind(FilterValue::Text(pattern.clone()));
                format!(
                    "{} LIKE {} ESCAPE '{}'",
                    target,
                    placeholder,
                    escape.to_string().replace('\'', "''")
                )
            }
            Predicate::IsNull(path) => format!("{} IS NULL", self.column(path)),
            Predicate::IsNotNull(path) => format!("{} IS NOT NULL", self.column(path)),
            Predicate::In { path, values } => {
                let column = self.column(path);
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let placeholders: Vec<String> =
                    values.iter().map(|v| self.bind(v.clone())).collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
        }
    }

    fn order(&mut self, order: &ResolvedOrder) -> String {
        let column = self.column(&order.path);
        let desc = order.direction.is_descending();
        match order.null_handling {
            NullHandling::Native => format!("{} {}", column, order.direction.as_sql()),
            NullHandling::NullsFirst => self.dialect.order_by_with_nulls(&column, desc, false),
            NullHandling::NullsLast => self.dialect.order_by_with_nulls(&column, desc, true),
        }
    }
}
