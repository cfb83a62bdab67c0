//! Configuration validation.

use super::Config;
use crate::drivers::SslMode;
use crate::error::{IntrospectError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;

    if conn.host.is_empty() {
        return Err(IntrospectError::Config("connection.host is required".into()));
    }
    if conn.database.is_empty() {
        return Err(IntrospectError::Config(
            "connection.database is required".into(),
        ));
    }
    if conn.user.is_empty() {
        return Err(IntrospectError::Config("connection.user is required".into()));
    }
    if let Some(0) = conn.port {
        return Err(IntrospectError::Config(
            "connection.port must be between 1 and 65535".into(),
        ));
    }
    if matches!(&conn.schema, Some(s) if s.is_empty()) {
        return Err(IntrospectError::Config(
            "connection.schema must not be empty when set".into(),
        ));
    }

    SslMode::parse(&conn.ssl_mode)?;

    if config.output.path.as_os_str().is_empty() {
        return Err(IntrospectError::Config("output.path is required".into()));
    }

    Ok(())
}
