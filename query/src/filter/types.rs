//! Filter type definitions
//!
//! Defines the operators, value payloads and parsed descriptors of encoded-key filters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::NESTED_ATTRIBUTE_SEPARATOR;
use crate::error::QueryError;

/// Encoded-key search parameters (`"GT_age" -> 18`)
///
/// Ordered by key so that the same parameters always render the same SQL.
pub type SearchParams = BTreeMap<String, FilterValue>;

/// Filter operators, matched case-sensitively against the key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Null,
    NotNull,
    In,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Like,
        Operator::Null,
        Operator::NotNull,
        Operator::In,
    ];

    /// Wire token of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::NotEq => "NOTEQ",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Like => "LIKE",
            Operator::Null => "NULL",
            Operator::NotNull => "NOTNULL",
            Operator::In => "IN",
        }
    }

    /// Operators that require an orderable value
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == token)
            .ok_or(())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter value payload
///
/// Deserializes from plain JSON values; objects are not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the payload kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::List(_) => "list",
        }
    }

    /// String form used for pattern matching. Null and lists have none.
    pub fn as_pattern_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Null | Self::List(_) => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A parsed search filter: attribute path, operator and raw value
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    attribute_path: String,
    operator: Operator,
    value: FilterValue,
}

impl FilterDescriptor {
    pub fn new(
        attribute_path: impl Into<String>,
        operator: Operator,
        value: FilterValue,
    ) -> Result<Self, QueryError> {
        let attribute_path = attribute_path.into();
        if attribute_path.trim().is_empty() {
            return Err(QueryError::invalid_path(
                attribute_path.clone(),
                attribute_path,
                "attribute path is blank",
            ));
        }
        Ok(Self {
            attribute_path,
            operator,
            value,
        })
    }

    pub fn attribute_path(&self) -> &str {
        &self.attribute_path
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Path segments; a path without separators is a single segment
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.attribute_path.split(NESTED_ATTRIBUTE_SEPARATOR)
    }
}
