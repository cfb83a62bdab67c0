//! Error types for the introspection library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for introspection operations.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// Configuration error (invalid YAML, missing fields, bad JDBC URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// An include/exclude pattern is not a valid regular expression
    #[error("Invalid table pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Could not open a connection to the catalog (host, credentials, network)
    #[error("Connection failed: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// MySQL metadata query error
    #[error("MySQL catalog query failed: {0}")]
    Mysql(#[from] sqlx::Error),

    /// PostgreSQL metadata query error
    #[error("PostgreSQL catalog query failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A type descriptor does not follow `identifier ['(' int [',' int] ')']`
    #[error("Invalid type format: '{descriptor}'")]
    InvalidTypeFormat { descriptor: String },

    /// The output file cannot be written (locked, directory, missing parent)
    #[error("Output target unavailable: {}: {reason}", path.display())]
    OutputTargetUnavailable { path: PathBuf, reason: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntrospectError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        IntrospectError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create an InvalidTypeFormat error
    pub fn invalid_type(descriptor: impl Into<String>) -> Self {
        IntrospectError::InvalidTypeFormat {
            descriptor: descriptor.into(),
        }
    }

    /// Create an OutputTargetUnavailable error
    pub fn output_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        IntrospectError::OutputTargetUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            IntrospectError::Config(_) | IntrospectError::InvalidPattern { .. } => 2,
            IntrospectError::Connection { .. } => 3,
            IntrospectError::OutputTargetUnavailable { .. } => 4,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, IntrospectError>;
