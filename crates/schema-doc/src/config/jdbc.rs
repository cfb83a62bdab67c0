//! JDBC URL parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::EngineKind;
use crate::error::{IntrospectError, Result};

static JDBC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^jdbc:(\w+)://([\w.-]+):(\d+)/([^/?;#]+)(?:[?;].*)?$")
        .expect("static regex must compile")
});

/// Connection coordinates extracted from a JDBC URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcUrl {
    pub engine: EngineKind,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl JdbcUrl {
    /// Parse `jdbc:<engine>://<host>:<port>/<database>`.
    ///
    /// Anything after the database name (`?useSSL=false`, `;options`) is ignored.
    pub fn parse(url: &str) -> Result<Self> {
        let caps = JDBC_RE.captures(url.trim()).ok_or_else(|| {
            IntrospectError::Config(format!(
                "Malformed JDBC URL '{}'. Expected jdbc:<engine>://<host>:<port>/<database>",
                url
            ))
        })?;

        let engine = caps[1].parse::<EngineKind>()?;
        let port = caps[3].parse::<u16>().map_err(|_| {
            IntrospectError::Config(format!("Invalid port '{}' in JDBC URL", &caps[3]))
        })?;

        Ok(Self {
            engine,
            host: caps[2].to_string(),
            port,
            database: caps[4].to_string(),
        })
    }
}
