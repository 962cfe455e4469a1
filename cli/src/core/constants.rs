// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "cquery";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".cquery";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "cquery.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CQUERY_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CQUERY_LOG";

/// Log filter when neither CQUERY_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "warn";

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for the database backend (sqlite or postgres)
pub const ENV_BACKEND: &str = "CQUERY_BACKEND";

/// Environment variable for the database URL
pub const ENV_DATABASE_URL: &str = "CQUERY_DATABASE_URL";

/// Environment variable for the connection pool size
pub const ENV_MAX_CONNECTIONS: &str = "CQUERY_MAX_CONNECTIONS";

// =============================================================================
// Database Defaults
// =============================================================================

/// Default connection pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;
