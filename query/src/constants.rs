// =============================================================================
// Encoded Filter Keys
// =============================================================================

/// Separator between the operator token and the attribute path (`GT_age`)
pub const OPERATOR_ATTRIBUTE_SEPARATOR: char = '_';

/// Separator between nested attribute names (`GT_user.age`)
pub const NESTED_ATTRIBUTE_SEPARATOR: char = '.';

/// Default request parameter prefix for search filters (`search_EQ_name=...`)
pub const SEARCH_FILTER_PREFIX: &str = "search_";

// =============================================================================
// Pattern Matching
// =============================================================================

/// Escape character passed to `LIKE ... ESCAPE` for substring filters
pub const LIKE_ESCAPE_CHAR: char = '/';

// =============================================================================
// Pagination
// =============================================================================

/// Maximum items per page
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Default page number (1-based)
pub const DEFAULT_PAGE: u32 = 1;

/// Default items per page
pub const DEFAULT_LIMIT: u32 = 50;

// =============================================================================
// SQL Rendering
// =============================================================================

/// Alias of the root entity table in rendered queries
pub const ROOT_TABLE_ALIAS: &str = "t0";
