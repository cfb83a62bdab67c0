//! # schema-doc
//!
//! Schema introspection for MySQL, PostgreSQL and PostgreSQL-derived engines.
//!
//! The library reads table and column metadata from a database catalog and
//! normalizes it into a dialect-independent model ready for documentation:
//!
//! - **Dialect readers** for MySQL `SHOW` commands, PostgreSQL
//!   `information_schema`, and restricted `pg_catalog`-only engines
//! - **Type normalization** of descriptors such as `decimal(10,2)`
//! - **Include/exclude filtering** of tables by regular expression
//! - **Rendering context** output as JSON or YAML
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_doc::{introspect, Config};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> schema_doc::Result<()> {
//!     let config = Config::load("schema-doc.yaml")?;
//!     config.validate()?;
//!     let db = introspect(&config.connection, &config.table_filter()?).await?;
//!     println!("{} tables", db.tables().len());
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod filter;
pub mod output;
pub mod typemap;

// Re-exports for convenient access
pub use assembler::{
    assemble, health_check, introspect, introspect_with, list_tables, HealthCheckResult,
};
pub use config::{Config, ConnectionConfig, EngineKind, JdbcUrl, OutputFormat};
pub use crate::core::{CatalogReader, Column, Database, RawTable, Table};
pub use drivers::ReaderImpl;
pub use error::{IntrospectError, Result};
pub use filter::TableFilter;
pub use output::{check_output_target, write_context, RenderContext};
pub use typemap::{parse_type, TypeDescriptor};
