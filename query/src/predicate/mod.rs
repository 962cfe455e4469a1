//! Predicate construction
//!
//! Resolves filter descriptors against an entity schema and combines them into a
//! single AND predicate. Path resolution happens here, not at parse time, so a filter
//! naming an unknown attribute parses fine and fails when the predicate is built.

mod ast;
mod builder;
pub(crate) mod path;

pub use ast::{CompareOp, Predicate};
pub use builder::build_predicate;
pub use path::{AttributePath, Join, resolve_path};

use crate::error::QueryError;
use crate::filter::{FilterDescriptor, SearchParams, parse_filters};
use crate::schema::{EntitySchema, SchemaRegistry};

/// Parsed search parameters, ready to be turned into a predicate for an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    filters: Vec<FilterDescriptor>,
}

impl Specification {
    /// Parse encoded-key search parameters
    pub fn parse(params: &SearchParams) -> Result<Self, QueryError> {
        let filters = parse_filters(params.iter().map(|(k, v)| (k.as_str(), v.clone())))?;
        Ok(Self { filters })
    }

    pub fn from_filters(filters: Vec<FilterDescriptor>) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_predicate(
        &self,
        registry: &SchemaRegistry,
        entity: &EntitySchema,
    ) -> Result<Predicate, QueryError> {
        build_predicate(registry, entity, &self.filters)
    }
}
