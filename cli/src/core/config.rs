use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use complex_query::constants::{DEFAULT_LIMIT, MAX_PAGE_LIMIT};
use complex_query::{Backend, EntitySchema, SchemaRegistry};

use crate::utils::path::{expand_path, sqlite_location};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_MAX_CONNECTIONS, ENV_DATABASE_URL,
};

// =============================================================================
// File Configuration (JSON)
// =============================================================================

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Backend: sqlite or postgres (inferred from the URL when omitted)
    pub backend: Option<Backend>,
    /// Connection URL (or use CQUERY_DATABASE_URL env var)
    pub url: Option<String>,
    /// Maximum number of connections in the pool (default: 2)
    pub max_connections: Option<u32>,
}

/// Query defaults section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    /// Rows per page when `--limit` is not given (default: 50)
    pub default_limit: Option<u32>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub database: Option<DatabaseFileConfig>,
    pub query: Option<QueryFileConfig>,
    /// Searchable entities with their columns and relations
    pub entities: Option<Vec<EntitySchema>>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    ///
    /// Entities merge by name: a later file redefines an entity it repeats.
    fn merge(&mut self, other: FileConfig) {
        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.backend.is_some() {
                tracing::trace!(backend = ?database.backend, "Merging database.backend");
                current.backend = database.backend;
            }
            if database.url.is_some() {
                tracing::trace!("Merging database.url");
                current.url = database.url;
            }
            if database.max_connections.is_some() {
                tracing::trace!(
                    max_connections = ?database.max_connections,
                    "Merging database.max_connections"
                );
                current.max_connections = database.max_connections;
            }
        }

        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.default_limit.is_some() {
                tracing::trace!(default_limit = ?query.default_limit, "Merging query.default_limit");
                current.default_limit = query.default_limit;
            }
        }

        if let Some(entities) = other.entities {
            let current = self.entities.get_or_insert_with(Vec::new);
            for entity in entities {
                tracing::trace!(entity = %entity.name, "Merging entity");
                current.retain(|e| e.name != entity.name);
                current.push(entity);
            }
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Resolved database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection URL, required by every command that touches the database
    pub fn url(&self) -> Result<&str> {
        self.url.as_deref().with_context(|| {
            format!(
                "No database URL configured. Set --database-url, {} or database.url in {}",
                ENV_DATABASE_URL, CONFIG_FILE_NAME
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub default_limit: u32,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub registry: Arc<SchemaRegistry>,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.cquery/cquery.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_layered(cli, get_profile_config_path())
    }

    /// Load with an explicit profile config location (`None` skips the profile layer)
    pub(crate) fn load_layered(cli: &CliConfig, profile_path: Option<PathBuf>) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.cquery/cquery.json) - skip if not exists
        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Layer configs: defaults -> file config -> CLI/env overrides
        let file_database = file_config.database.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();

        let url = cli.database_url.clone().or(file_database.url);
        let backend = cli
            .backend
            .or(file_database.backend)
            .or_else(|| url.as_deref().map(infer_backend))
            .unwrap_or_default();
        let url = match backend {
            Backend::Sqlite => url.map(|u| sqlite_location(&u)),
            Backend::Postgres => url,
        };

        let registry: SchemaRegistry = file_config.entities.unwrap_or_default().into();

        let config = Self {
            database: DatabaseConfig {
                backend,
                url,
                max_connections: cli
                    .max_connections
                    .or(file_database.max_connections)
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            query: QueryConfig {
                default_limit: file_query.default_limit.unwrap_or(DEFAULT_LIMIT),
            },
            registry: Arc::new(registry),
        };

        config.validate()?;

        tracing::debug!(
            backend = %config.database.backend,
            entities = config.registry.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.database.url
            && url.trim().is_empty()
        {
            anyhow::bail!("Configuration error: database.url must not be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Configuration error: database.max_connections must be greater than 0");
        }

        if self.query.default_limit == 0 || self.query.default_limit > MAX_PAGE_LIMIT {
            anyhow::bail!(
                "Configuration error: query.default_limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            );
        }

        self.registry
            .validate()
            .context("Configuration error: invalid entities")?;

        Ok(())
    }
}

/// Get the profile config path (~/.cquery/cquery.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Guess the backend from a connection URL scheme
fn infer_backend(url: &str) -> Backend {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Backend::Postgres
    } else {
        Backend::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use complex_query::ColumnType;

    const ENTITIES_JSON: &str = r#"{
        "entities": [
            {
                "name": "organizations",
                "table": "organizations",
                "attributes": {
                    "id": { "kind": "column", "column": "id", "type": "integer" },
                    "name": { "kind": "column", "column": "name", "type": "text" }
                }
            },
            {
                "name": "users",
                "table": "users",
                "attributes": {
                    "id": { "kind": "column", "column": "id", "type": "integer" },
                    "organization": {
                        "kind": "relation",
                        "entity": "organizations",
                        "column": "organization_id",
                        "references": "id"
                    }
                }
            }
        ]
    }"#;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn load_file(path: &Path) -> Result<AppConfig> {
        let cli = CliConfig {
            config: Some(path.to_path_buf()),
            ..Default::default()
        };
        AppConfig::load_layered(&cli, None)
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "database": { "backend": "postgres", "url": "postgres://localhost/app", "max_connections": 4 },
            "query": { "default_limit": 25 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let database = config.database.as_ref().unwrap();
        assert_eq!(database.backend, Some(Backend::Postgres));
        assert_eq!(database.url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(database.max_connections, Some(4));
        assert_eq!(config.query.as_ref().unwrap().default_limit, Some(25));
        assert!(config.entities.is_none());
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.database.is_none());
        assert!(config.query.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "database": { "url": "app.db" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_parse_entities() {
        let config: FileConfig = serde_json::from_str(ENTITIES_JSON).unwrap();
        let entities = config.entities.unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].column_type("organization_id"), None);
        assert_eq!(entities[0].column_type("name"), Some(ColumnType::Text));
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "database": { "url": "base.db", "max_connections": 3 },
                "entities": [ { "name": "a", "table": "a_v1", "attributes": {} } ]
            }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{
                "database": { "url": "overlay.db" },
                "query": { "default_limit": 10 },
                "entities": [
                    { "name": "a", "table": "a_v2", "attributes": {} },
                    { "name": "b", "table": "b", "attributes": {} }
                ]
            }"#,
        )
        .unwrap();

        base.merge(overlay);

        let database = base.database.unwrap();
        assert_eq!(database.url.as_deref(), Some("overlay.db"));
        assert_eq!(database.max_connections, Some(3));
        assert_eq!(base.query.unwrap().default_limit, Some(10));

        let entities = base.entities.unwrap();
        let tables: Vec<&str> = entities.iter().map(|e| e.table.as_str()).collect();
        assert_eq!(tables, vec!["a_v2", "b"]);
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::load_layered(&CliConfig::default(), None).unwrap();

        assert_eq!(config.database.backend, Backend::Sqlite);
        assert!(config.database.url.is_none());
        assert!(config.database.url().is_err());
        assert_eq!(config.database.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.query.default_limit, DEFAULT_LIMIT);
        assert!(config.registry.is_empty());
    }

    #[test]
    fn test_app_config_from_file() {
        let file = write_config(ENTITIES_JSON);
        let config = load_file(file.path()).unwrap();

        assert_eq!(config.registry.len(), 2);
        assert!(config.registry.get("users").is_ok());
    }

    #[test]
    fn test_app_config_cli_override() {
        let file = write_config(
            r#"{ "database": { "backend": "sqlite", "url": "file.db", "max_connections": 3 } }"#,
        );
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            backend: Some(Backend::Postgres),
            database_url: Some("postgres://db/app".to_string()),
            max_connections: Some(8),
        };
        let config = AppConfig::load_layered(&cli, None).unwrap();

        assert_eq!(config.database.backend, Backend::Postgres);
        assert_eq!(config.database.url().unwrap(), "postgres://db/app");
        assert_eq!(config.database.max_connections, 8);
    }

    #[test]
    fn test_app_config_profile_then_overlay() {
        let profile = write_config(
            r#"{ "database": { "url": "postgres://profile/app" }, "query": { "default_limit": 20 } }"#,
        );
        let overlay = write_config(r#"{ "query": { "default_limit": 30 } }"#);
        let cli = CliConfig {
            config: Some(overlay.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load_layered(&cli, Some(profile.path().to_path_buf())).unwrap();

        assert_eq!(config.database.backend, Backend::Postgres);
        assert_eq!(config.database.url().unwrap(), "postgres://profile/app");
        assert_eq!(config.query.default_limit, 30);
    }

    #[test]
    fn test_app_config_sqlite_path_expanded() {
        let cli = CliConfig {
            database_url: Some("data/app.db".to_string()),
            ..Default::default()
        };
        let config = AppConfig::load_layered(&cli, None).unwrap();
        let url = config.database.url().unwrap();
        assert!(Path::new(url).is_absolute());
        assert!(url.ends_with("app.db"));
    }

    #[test]
    fn test_app_config_missing_file() {
        let err = load_file(Path::new("/nonexistent/cquery.json")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_invalid_json() {
        let file = write_config("{ not json");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_app_config_validation_default_limit() {
        let file = write_config(r#"{ "query": { "default_limit": 0 } }"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("query.default_limit"));

        let file = write_config(r#"{ "query": { "default_limit": 501 } }"#);
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn test_app_config_validation_max_connections() {
        let file = write_config(r#"{ "database": { "max_connections": 0 } }"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }

    #[test]
    fn test_app_config_validation_empty_url() {
        let file = write_config(r#"{ "database": { "backend": "postgres", "url": "  " } }"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn test_app_config_validation_dangling_relation() {
        let file = write_config(
            r#"{ "entities": [ {
                "name": "users", "table": "users",
                "attributes": {
                    "organization": { "kind": "relation", "entity": "organizations", "column": "organization_id", "references": "id" }
                }
            } ] }"#,
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid entities"));
    }

    #[test]
    fn test_infer_backend() {
        assert_eq!(infer_backend("postgres://localhost/db"), Backend::Postgres);
        assert_eq!(infer_backend("postgresql://localhost/db"), Backend::Postgres);
        assert_eq!(infer_backend("sqlite://app.db"), Backend::Sqlite);
        assert_eq!(infer_backend("app.db"), Backend::Sqlite);
    }
}
