//! Search filter system
//!
//! Parses encoded-key search parameters into filter descriptors.
//! Keys have the form `OPERATOR_attribute`, with nested attributes separated by `.`
//! (`GT_user.age`). Supported operators: EQ, NOTEQ, GT, GTE, LT, LTE, LIKE, NULL,
//! NOTNULL and IN.
//!
//! ## Usage
//!
//! ```
//! use complex_query::filter::{FilterValue, Operator, SearchParams, parse_filters};
//!
//! let mut params = SearchParams::new();
//! params.insert("GT_user.age".to_string(), FilterValue::Int(18));
//!
//! let filters = parse_filters(params).unwrap();
//! assert_eq!(filters[0].operator(), Operator::Gt);
//! assert_eq!(filters[0].attribute_path(), "user.age");
//! ```

mod params;
mod parser;
mod types;

pub use params::params_with_prefix;
pub use parser::parse_filters;
pub use types::{FilterDescriptor, FilterValue, Operator, SearchParams};
