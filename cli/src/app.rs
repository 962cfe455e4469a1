//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use complex_query::data::postgres::{self, PostgresQueryRepository};
use complex_query::data::sqlite::{self, SqliteQueryRepository};
use complex_query::{Backend, ComplexQueryRepository, PageRequest, Record};

use crate::core::cli::{self, Commands, SearchArgs};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};

type RecordRepository = Box<dyn ComplexQueryRepository<Record>>;

pub struct CoreApp {
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self {
            config: AppConfig::load(&cli_config)?,
        };
        let output = app.execute(command).await?;

        let rendered = serde_json::to_string_pretty(&output).context("Failed to render output")?;
        println!("{}", rendered);
        Ok(())
    }

    /// Execute one command and return its JSON output
    pub async fn execute(&self, command: Commands) -> Result<Value> {
        let sort = command.sort();
        match command {
            Commands::Entities => {
                let entities: Vec<_> = self.config.registry.entities().collect();
                Ok(serde_json::to_value(entities)?)
            }
            Commands::List { search, .. } => {
                let repository = self.repository(&search).await?;
                let rows = repository
                    .query_sorted(&search.params(), &sort)
                    .await
                    .with_context(|| format!("Failed to list '{}'", search.entity))?;
                Ok(serde_json::to_value(rows)?)
            }
            Commands::Page {
                search,
                page,
                limit,
                ..
            } => {
                let request = PageRequest::new(page, limit.unwrap_or(self.config.query.default_limit))?
                    .with_sort(sort);
                let repository = self.repository(&search).await?;
                let page = repository
                    .query_page(&search.params(), &request)
                    .await
                    .with_context(|| format!("Failed to page '{}'", search.entity))?;
                Ok(json!({
                    "content": page.content,
                    "page": page.page,
                    "limit": page.limit,
                    "total": page.total,
                    "total_pages": page.total_pages,
                    "has_next": page.has_next(),
                    "has_previous": page.has_previous(),
                }))
            }
            Commands::Count { search } => {
                let repository = self.repository(&search).await?;
                let count = repository
                    .count(&search.params())
                    .await
                    .with_context(|| format!("Failed to count '{}'", search.entity))?;
                Ok(json!({ "entity": search.entity, "count": count }))
            }
        }
    }

    /// Open a pool for the configured backend and wrap it in a record repository
    async fn repository(&self, search: &SearchArgs) -> Result<RecordRepository> {
        // Unknown entities fail before any connection is made
        self.config.registry.get(&search.entity)?;

        let database = &self.config.database;
        let url = database.url()?;
        let registry = Arc::clone(&self.config.registry);

        let repository: RecordRepository = match database.backend {
            Backend::Sqlite => {
                let pool = sqlite::connect(url, database.max_connections)
                    .await
                    .with_context(|| format!("Failed to open SQLite database: {}", url))?;
                Box::new(SqliteQueryRepository::new(pool, registry, &search.entity)?)
            }
            Backend::Postgres => {
                let pool = postgres::connect(url, database.max_connections)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                Box::new(PostgresQueryRepository::new(pool, registry, &search.entity)?)
            }
        };

        tracing::debug!(
            backend = %database.backend,
            entity = %search.entity,
            "Repository ready"
        );
        Ok(repository)
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        // stdout carries the JSON output
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
