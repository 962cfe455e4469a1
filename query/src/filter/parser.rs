//! Filter parsing
//!
//! Splits encoded keys (`OPERATOR_attribute.path`) into filter descriptors.

use crate::constants::OPERATOR_ATTRIBUTE_SEPARATOR;
use crate::error::QueryError;

use super::types::{FilterDescriptor, FilterValue, Operator};

/// Parse encoded search parameters into filter descriptors
///
/// Produces one descriptor per entry, in iteration order. Values are passed through
/// unchanged; type checks happen when the predicate is built.
pub fn parse_filters<I, K>(params: I) -> Result<Vec<FilterDescriptor>, QueryError>
where
    I: IntoIterator<Item = (K, FilterValue)>,
    K: AsRef<str>,
{
    let filters = params
        .into_iter()
        .map(|(key, value)| {
            let key = key.as_ref();
            let (operator, path) = split_key(key)?;
            FilterDescriptor::new(path, operator, value)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = filters.len(), "Parsed search filters");
    Ok(filters)
}

/// Split a key once at the first separator into operator and attribute path
fn split_key(key: &str) -> Result<(Operator, &str), QueryError> {
    let malformed = || QueryError::MalformedKey {
        key: key.to_string(),
    };

    let (token, path) = key
        .split_once(OPERATOR_ATTRIBUTE_SEPARATOR)
        .ok_or_else(malformed)?;
    if token.trim().is_empty() || path.trim().is_empty() {
        return Err(malformed());
    }

    let operator = token
        .parse::<Operator>()
        .map_err(|_| QueryError::UnknownOperator {
            token: token.to_string(),
            key: key.to_string(),
        })?;

    Ok((operator, path))
}
