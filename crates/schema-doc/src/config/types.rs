//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntrospectError;

/// Database engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// MySQL and MariaDB.
    #[default]
    #[serde(alias = "mariadb")]
    Mysql,

    /// PostgreSQL with a standard `information_schema`.
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,

    /// PostgreSQL-derived engine whose `information_schema.columns` is missing
    /// or incompatible; columns are read from the primitive `pg_*` catalogs.
    PgCatalog,
}

impl EngineKind {
    /// Identifier used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Mysql => "mysql",
            EngineKind::Postgres => "postgres",
            EngineKind::PgCatalog => "pg-catalog",
        }
    }

    /// Default TCP port.
    pub fn default_port(&self) -> u16 {
        match self {
            EngineKind::Mysql => 3306,
            EngineKind::Postgres | EngineKind::PgCatalog => 5432,
        }
    }

    /// Whether this engine speaks the PostgreSQL wire protocol.
    pub fn is_postgres_family(&self) -> bool {
        matches!(self, EngineKind::Postgres | EngineKind::PgCatalog)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = IntrospectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(EngineKind::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(EngineKind::Postgres),
            "pg-catalog" | "pg_catalog" | "pgcatalog" => Ok(EngineKind::PgCatalog),
            other => Err(IntrospectError::Config(format!(
                "Unknown database engine: '{}'. Supported engines: mysql, postgres, pg-catalog",
                other
            ))),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog connection.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Table filtering.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Rendering context output.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Catalog connection configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Engine family (default: mysql).
    #[serde(default)]
    pub engine: EngineKind,

    /// Database host.
    #[serde(default)]
    pub host: String,

    /// Database port (default depends on engine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Schema to introspect (default: "public" for PostgreSQL engines,
    /// the database name for MySQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// SSL mode: disable, require, verify-ca, verify-full (default: disable).
    #[serde(default = "default_disable")]
    pub ssl_mode: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl ConnectionConfig {
    /// Port to connect to, falling back to the engine default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    /// Schema to introspect, falling back to the engine default.
    pub fn effective_schema(&self) -> String {
        match &self.schema {
            Some(schema) if !schema.is_empty() => schema.clone(),
            _ if self.engine.is_postgres_family() => "public".to_string(),
            _ => self.database.clone(),
        }
    }

    /// `engine host:port/database` for log lines (no credentials).
    pub fn describe(&self) -> String {
        format!(
            "{} {}:{}/{}",
            self.engine,
            self.host,
            self.effective_port(),
            self.database
        )
    }
}

/// Table filter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Patterns that rescue a table from exclusion (regular expressions).
    #[serde(default)]
    pub include: Vec<String>,

    /// Patterns that exclude a table (regular expressions).
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Rendering context file (default: db-doc.json).
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Serialization format (default: json).
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
        }
    }
}

/// Rendering context serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = IntrospectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(IntrospectError::Config(format!(
                "Invalid output format '{}'. Valid values: json, yaml",
                other
            ))),
        }
    }
}

// Default value functions for serde
fn default_disable() -> String {
    "disable".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("db-doc.json")
}
