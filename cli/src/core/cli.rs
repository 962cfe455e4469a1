use clap::{Args, Parser, Subcommand};

use std::path::PathBuf;

use complex_query::constants::DEFAULT_PAGE;
use complex_query::{Backend, Direction, FilterValue, Order, SearchParams, Sort};

use super::constants::{
    APP_NAME_LOWER, ENV_BACKEND, ENV_CONFIG, ENV_DATABASE_URL, ENV_MAX_CONNECTIONS,
};

#[derive(Parser)]
#[command(name = APP_NAME_LOWER)]
#[command(version, about = "Search relational tables with encoded-key filters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Database backend (sqlite or postgres); inferred from the URL when omitted
    #[arg(long, global = true, env = ENV_BACKEND, value_parser = parse_backend)]
    pub backend: Option<Backend>,

    /// Database URL (postgres://... or a SQLite file path / sqlite: URL)
    #[arg(long, global = true, env = ENV_DATABASE_URL)]
    pub database_url: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long, global = true, env = ENV_MAX_CONNECTIONS)]
    pub max_connections: Option<u32>,
}

/// Parse backend from CLI/env string
fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}

/// Parse a `KEY=VALUE` filter; VALUE is JSON when it parses, a plain string otherwise
fn parse_filter(s: &str) -> Result<(String, FilterValue), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid filter '{}'. Expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid filter '{}'. Key must not be empty", s));
    }
    let value = serde_json::from_str::<FilterValue>(raw)
        .unwrap_or_else(|_| FilterValue::Text(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Parse a `PROPERTY[:asc|desc]` sort term
fn parse_order(s: &str) -> Result<Order, String> {
    let (property, direction) = match s.rsplit_once(':') {
        Some((property, direction)) => (property, direction.parse::<Direction>()?),
        None => (s, Direction::Asc),
    };
    let property = property.trim();
    if property.is_empty() {
        return Err(format!("Invalid sort '{}'. Expected PROPERTY[:asc|desc]", s));
    }
    Ok(Order::new(property, direction))
}

/// Entity and filters shared by the search commands
#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Entity to search, as named in the config
    #[arg(long, short = 'e')]
    pub entity: String,

    /// Filter as KEY=VALUE, e.g. GT_age=18 or IN_status='["A","B"]' (repeatable)
    #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
    pub filters: Vec<(String, FilterValue)>,
}

impl SearchArgs {
    /// Filters as search parameters; a repeated key keeps its last value
    pub fn params(&self) -> SearchParams {
        self.filters.iter().cloned().collect()
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print every matching row
    List {
        #[command(flatten)]
        search: SearchArgs,

        /// Sort as PROPERTY[:asc|desc], highest priority first (repeatable)
        #[arg(long = "sort", short = 's', value_parser = parse_order)]
        sort: Vec<Order>,
    },
    /// Print one page of matching rows with totals
    Page {
        #[command(flatten)]
        search: SearchArgs,

        /// Sort as PROPERTY[:asc|desc], highest priority first (repeatable)
        #[arg(long = "sort", short = 's', value_parser = parse_order)]
        sort: Vec<Order>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,

        /// Rows per page (default from config, then 50)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print the number of matching rows
    Count {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Print the registered entity schemas
    Entities,
}

impl Commands {
    /// Sort terms of a list or page command
    pub fn sort(&self) -> Sort {
        match self {
            Commands::List { sort, .. } | Commands::Page { sort, .. } => Sort::by(sort.clone()),
            Commands::Count { .. } | Commands::Entities => Sort::unsorted(),
        }
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    split(Cli::parse())
}

fn split(cli: Cli) -> (CliConfig, Commands) {
    let config = CliConfig {
        config: cli.config,
        backend: cli.backend,
        database_url: cli.database_url,
        max_connections: cli.max_connections,
    };
    (config, cli.command)
}
