//! Encoded-key search filters for relational queries
//!
//! Callers describe a query as a flat map of `OPERATOR_attribute.path` keys to values.
//! The map is parsed into [`FilterDescriptor`]s, resolved against a [`SchemaRegistry`]
//! into a [`Predicate`] tree, rendered to SQL for a [`data::sql::Backend`], and executed
//! through a [`ComplexQueryRepository`].
//!
//! ## Usage
//!
//! ```no_run
//! use complex_query::{ColumnType, EntitySchema, FilterValue, SchemaRegistry, SearchParams, Specification};
//!
//! let mut registry = SchemaRegistry::default();
//! registry.register(
//!     EntitySchema::new("users", "users")
//!         .column("name", ColumnType::Text)
//!         .column("age", ColumnType::Integer),
//! );
//!
//! let mut params = SearchParams::new();
//! params.insert("GT_age".to_string(), FilterValue::Int(18));
//! params.insert("LIKE_name".to_string(), FilterValue::from("ann"));
//!
//! let spec = Specification::parse(&params).unwrap();
//! let users = registry.get("users").unwrap();
//! let predicate = spec.to_predicate(&registry, users).unwrap();
//! assert!(!predicate.matches_all());
//! ```

pub mod constants;
pub mod data;
pub mod error;
pub mod filter;
pub mod predicate;
pub mod schema;
pub mod utils;

pub use data::sql::Backend;
pub use data::traits::ComplexQueryRepository;
pub use data::types::{Direction, NullHandling, Order, Page, PageRequest, Sort};
pub use data::{DataError, Record};
pub use error::QueryError;
pub use filter::{
    FilterDescriptor, FilterValue, Operator, SearchParams, parse_filters, params_with_prefix,
};
pub use predicate::{AttributePath, CompareOp, Predicate, Specification, build_predicate};
pub use schema::{Attribute, ColumnType, EntitySchema, SchemaRegistry};
