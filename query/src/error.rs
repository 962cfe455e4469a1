//! Query construction errors
//!
//! Every variant aborts the query before anything reaches the database.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Key does not split into `OPERATOR_attribute`
    #[error("Malformed filter key: {key}")]
    MalformedKey { key: String },

    /// Operator token is not one of the supported operators
    #[error("Unknown operator '{token}' in filter key: {key}")]
    UnknownOperator { token: String, key: String },

    /// Attribute path does not resolve against the entity schema
    #[error("Invalid attribute path '{path}' at segment '{segment}': {reason}")]
    InvalidAttributePath {
        path: String,
        segment: String,
        reason: String,
    },

    /// Ordering operator applied to a value that cannot be ordered against the column
    #[error("Non-comparable value for '{path}': {value_kind} cannot be ordered against a {column_type} column")]
    NonComparableValue {
        path: String,
        value_kind: &'static str,
        column_type: String,
    },

    /// IN operator given something other than a flat list
    #[error("Invalid IN operand for '{path}': expected a list, got {value_kind}")]
    InvalidInOperand {
        path: String,
        value_kind: &'static str,
    },

    /// LIKE operator given a value that cannot be matched against the column's text
    #[error("Invalid LIKE operand for '{path}': {value_kind} cannot be matched against a {column_type} column")]
    InvalidLikeOperand {
        path: String,
        value_kind: &'static str,
        column_type: String,
    },

    #[error("Unknown entity: {name}")]
    UnknownEntity { name: String },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),
}

impl QueryError {
    pub(crate) fn invalid_path(
        path: impl Into<String>,
        segment: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidAttributePath {
            path: path.into(),
            segment: segment.into(),
            reason: reason.into(),
        }
    }
}
