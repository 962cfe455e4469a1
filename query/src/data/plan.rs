//! Query planning shared by the repositories
//!
//! Parses and resolves everything up front so that a bad filter or sort property is
//! reported before a connection is acquired.

use crate::error::QueryError;
use crate::filter::SearchParams;
use crate::predicate::{Predicate, Specification, resolve_path};
use crate::schema::{EntitySchema, SchemaRegistry};

use super::sql::{ResolvedOrder, SqlDialect, SqlQuery, render_count, render_select};
use super::types::Sort;

/// Fully resolved query against one entity
#[derive(Debug, Clone)]
pub struct QueryPlan<'a> {
    entity: &'a EntitySchema,
    predicate: Predicate,
    orders: Vec<ResolvedOrder>,
}

impl<'a> QueryPlan<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        entity: &str,
        params: &SearchParams,
        sort: &Sort,
    ) -> Result<Self, QueryError> {
        let entity = registry.get(entity)?;
        let predicate = Specification::parse(params)?.to_predicate(registry, entity)?;
        let orders = sort
            .orders()
            .iter()
            .map(|order| {
                Ok(ResolvedOrder {
                    path: resolve_path(registry, entity, &order.property)?,
                    direction: order.direction,
                    null_handling: order.null_handling,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        Ok(Self {
            entity,
            predicate,
            orders,
        })
    }

    pub fn entity(&self) -> &EntitySchema {
        self.entity
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn select(&self, dialect: &dyn SqlDialect, window: Option<(u32, u64)>) -> SqlQuery {
        render_select(dialect, self.entity, &self.predicate, &self.orders, window)
    }

    pub fn count(&self, dialect: &dyn SqlDialect) -> SqlQuery {
        render_count(dialect, self.entity, &self.predicate)
    }
}
