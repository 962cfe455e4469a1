//! SQL utility functions

/// Escape SQL LIKE metacharacters in user input
///
/// Trims the input, then doubles `escape`, then escapes `_` and `%` with it, so the
/// result matches literally when used with `LIKE ... ESCAPE '<escape>'`.
///
/// # Example
///
/// ```
/// use complex_query::utils::sql::escape_like_pattern;
///
/// let pattern = format!("%{}%", escape_like_pattern(" 50%_off/ ", '/'));
/// assert_eq!(pattern, "%50/%/_off//%");
/// ```
pub fn escape_like_pattern(s: &str, escape: char) -> String {
    let escape = escape.to_string();
    s.trim()
        .replace(&escape, &format!("{escape}{escape}"))
        .replace('_', &format!("{escape}_"))
        .replace('%', &format!("{escape}%"))
}
