//! Request parameter extraction

use super::types::{FilterValue, SearchParams};

/// Collect request parameters that start with `prefix`, with the prefix stripped
///
/// Parameters without values are skipped, single values become text and repeated
/// values become a list of text. An empty prefix keeps every parameter.
pub fn params_with_prefix<I, N, V>(params: I, prefix: &str) -> SearchParams
where
    I: IntoIterator<Item = (N, Vec<V>)>,
    N: AsRef<str>,
    V: Into<String>,
{
    let mut result = SearchParams::new();
    for (name, values) in params {
        let Some(stripped) = name.as_ref().strip_prefix(prefix) else {
            continue;
        };
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        let value = match values.len() {
            0 => continue,
            1 => FilterValue::Text(values.remove(0)),
            _ => FilterValue::List(values.into_iter().map(FilterValue::Text).collect()),
        };
        result.insert(stripped.to_string(), value);
    }
    result
}
