//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB (`SHOW` commands, combined type descriptors)
//! - [`postgres`]: PostgreSQL (`information_schema` + `pg_catalog`)
//! - [`pgcatalog`]: PostgreSQL-derived engines read through `pg_catalog` only
//! - [`common`]: TLS and identifier quoting
//!
//! [`ReaderImpl`] dispatches statically over the three readers; the compiler
//! generates a match instead of vtable calls.

pub mod common;
pub mod mysql;
pub mod pgcatalog;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};
pub use mysql::MysqlReader;
pub use pgcatalog::PgCatalogReader;
pub use postgres::PostgresReader;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::config::{ConnectionConfig, EngineKind};
use crate::core::schema::{RawColumn, RawTable};
use crate::core::traits::CatalogReader;
use crate::error::Result;

/// Enum-based static dispatch over the catalog readers.
pub enum ReaderImpl {
    Mysql(MysqlReader),
    Postgres(PostgresReader),
    PgCatalog(PgCatalogReader),
}

impl ReaderImpl {
    /// Open the reader for the configured engine.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        match config.engine {
            EngineKind::Mysql => Ok(Self::Mysql(MysqlReader::connect(config).await?)),
            EngineKind::Postgres => Ok(Self::Postgres(PostgresReader::connect(config).await?)),
            EngineKind::PgCatalog => {
                Ok(Self::PgCatalog(PgCatalogReader::connect(config).await?))
            }
        }
    }
}

#[async_trait]
impl CatalogReader for ReaderImpl {
    async fn list_tables(&mut self) -> Result<Vec<RawTable>> {
        match self {
            Self::Mysql(r) => r.list_tables().await,
            Self::Postgres(r) => r.list_tables().await,
            Self::PgCatalog(r) => r.list_tables().await,
        }
    }

    async fn list_columns(&mut self, table: &str) -> Result<Vec<RawColumn>> {
        match self {
            Self::Mysql(r) => r.list_columns(table).await,
            Self::Postgres(r) => r.list_columns(table).await,
            Self::PgCatalog(r) => r.list_columns(table).await,
        }
    }

    async fn primary_key_columns(&mut self, table: &str) -> Result<HashSet<String>> {
        match self {
            Self::Mysql(r) => r.primary_key_columns(table).await,
            Self::Postgres(r) => r.primary_key_columns(table).await,
            Self::PgCatalog(r) => r.primary_key_columns(table).await,
        }
    }

    fn engine(&self) -> EngineKind {
        match self {
            Self::Mysql(r) => r.engine(),
            Self::Postgres(r) => r.engine(),
            Self::PgCatalog(r) => r.engine(),
        }
    }

    async fn close(&mut self) {
        match self {
            Self::Mysql(r) => r.close().await,
            Self::Postgres(r) => r.close().await,
            Self::PgCatalog(r) => r.close().await,
        }
    }
}
