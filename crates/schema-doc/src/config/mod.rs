//! Configuration loading and validation.
//!
//! A YAML file supplies defaults; the CLI layers JDBC URL values and explicit
//! flags on top and only then calls [`Config::validate`].

mod jdbc;
mod types;
mod validation;

pub use jdbc::JdbcUrl;
pub use types::*;

use crate::error::{IntrospectError, Result};
use crate::filter::TableFilter;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file without validating it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IntrospectError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string without validating it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Compile the include/exclude patterns.
    pub fn table_filter(&self) -> Result<TableFilter> {
        TableFilter::new(&self.filter.include, &self.filter.exclude)
    }

    /// Overlay the coordinates of a JDBC URL.
    pub fn apply_jdbc(&mut self, url: &JdbcUrl) {
        self.connection.engine = url.engine;
        self.connection.host = url.host.clone();
        self.connection.port = Some(url.port);
        self.connection.database = url.database.clone();
    }
}
